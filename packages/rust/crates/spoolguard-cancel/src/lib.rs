#![allow(clippy::doc_markdown)]

//! spoolguard-cancel - Best-effort print job cancellation
//!
//! Cancels a job through an ordered chain of capability providers and stops
//! at the first success. Provider failures are recorded per step, never
//! propagated.
//!
//! # Architecture
//!
//! ```text
//! spoolguard-cancel/src/
//! ├── lib.rs           # Re-exports (this file)
//! ├── error.rs         # CancelError enum
//! ├── provider.rs      # NativeLocator / QueueDirectory / StructuredQuery
//! ├── filter.rs        # Tolerant structured-query filter
//! └── orchestrator.rs  # Fallback chain + CancelOutcome
//! ```
//!
//! # Chain
//!
//! ```text
//! NativeLocator::delete(native_path)
//!   ↓ (no success)
//! QueueSearch    - named queue: id → title ∋ id → submitter == owner → title ∋ owner
//!   ↓
//! BroadScan      - every local/shared/connected queue, numeric id only
//!   ↓
//! StructuredQuery - JobFilter, first consistent record
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
mod filter;
mod orchestrator;
mod provider;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::CancelError;
pub use filter::JobFilter;
pub use orchestrator::{
    AttemptResult, CancelAttempt, CancelOutcome, CancelStep, CancellationOrchestrator,
    CancellationRequest,
};
pub use provider::{
    JobRecord, NativeLocator, QueueDirectory, QueueInfo, QueueKind, QueuedJob, StructuredQuery,
};
