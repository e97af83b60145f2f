//! Provider error taxonomy.

use thiserror::Error;

/// Failure reported by a cancellation provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CancelError {
    /// The caller lacks rights on the job or queue.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The job or queue does not exist (any more).
    #[error("not found: {0}")]
    NotFound(String),

    /// Temporary failure; a later attempt may succeed.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Any other provider failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl CancelError {
    /// Whether a later retry could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
