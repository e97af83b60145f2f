//! Error types for copy-count inference.
//!
//! Strategy errors never escape the engine; they are surfaced so callers and
//! tests can tell "signal errored" apart from "signal absent".

use spoolguard_types::AttributeError;
use thiserror::Error;

/// Failure inside one inference strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferError {
    /// A field was present but unreadable.
    #[error("attribute error: {0}")]
    Attribute(#[from] AttributeError),

    /// A numeric field held a value no copy count can have.
    #[error("field {field} out of range: {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: i64,
    },
}
