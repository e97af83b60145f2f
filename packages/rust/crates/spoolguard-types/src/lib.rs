#![allow(clippy::doc_markdown)]

//! spoolguard-types - Shared data model for the spoolguard print monitor
//!
//! Every crate in the workspace speaks in these types: the attribute bag a
//! spooler hands over, the normalized `JobObservation`, and the signature
//! used to correlate repeated sightings.
//!
//! # Architecture
//!
//! ```text
//! spoolguard-types/src/
//! ├── lib.rs          # Re-exports (this file)
//! ├── attributes.rs   # AttributeSource capability + AttributeMap
//! ├── observation.rs  # JobObservation, JobSignature, CopyBasis
//! └── queue.rs        # QueueLocation (host queue parsing)
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod attributes;
mod observation;
mod queue;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use attributes::{AttributeError, AttributeMap, AttributeSource, AttributeValue, fields};
pub use observation::{
    CopyBasis, JobObservation, JobOperationKind, JobSignature, ObservationSource,
};
pub use queue::QueueLocation;
