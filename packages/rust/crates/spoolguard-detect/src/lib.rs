#![allow(clippy::doc_markdown)]

//! spoolguard-detect - Job detection and copy-count inference
//!
//! Decides, from unreliable and overlapping signals, whether a print job asks
//! for more than one copy, and keeps repeated sightings of the same job from
//! triggering twice.
//!
//! # Architecture
//!
//! ```text
//! spoolguard-detect/src/
//! ├── lib.rs         # Re-exports (this file)
//! ├── error.rs       # InferError enum
//! ├── identity.rs    # "<queue>, <id>" resolver
//! ├── infer.rs       # Ordered strategy chain
//! ├── ticket.rs      # Embedded print ticket scanning
//! ├── name_hint.rs   # Multiplicity markers in descriptive names
//! └── suppressor.rs  # Signature windows + per-job dispositions
//! ```
//!
//! # Example
//!
//! ```rust
//! use spoolguard_detect::{infer_copies, resolve};
//! use spoolguard_types::AttributeMap;
//!
//! let identity = resolve(Some("Office, 55"));
//! assert_eq!(identity.job_id, "55");
//!
//! let attrs = AttributeMap::new().with("Name", "Office, 55").with("Copies", 5);
//! assert_eq!(infer_copies(&attrs), 5);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
mod identity;
mod infer;
mod name_hint;
mod suppressor;
mod ticket;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::InferError;
pub use identity::{ResolvedIdentity, resolve};
pub use infer::{
    CopyInference, Inference, InferenceContext, MAX_TOTAL_PAGES_AS_COPIES, Strategy,
    StrategyOutcome, infer_copies,
};
pub use name_hint::parse_name_hint;
pub use suppressor::{
    Corroboration, DEFAULT_SIGNATURE_WINDOW, DuplicateSuppressor, JobDisposition, SignatureCheck,
};
pub use ticket::parse_ticket_copies;
