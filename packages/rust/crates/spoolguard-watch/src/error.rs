//! Error types for markers and the drop watcher.

use std::path::PathBuf;

use thiserror::Error;

/// Override marker failures.
#[derive(Error, Debug)]
pub enum MarkerError {
    /// Job id cannot name a marker file.
    #[error("invalid job id for marker: {0:?}")]
    InvalidJobId(String),

    /// Filesystem failure on a marker path.
    #[error("marker IO error at {path}: {source}")]
    Io {
        /// Marker or directory path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Drop watcher failures.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The platform watcher could not be created or attached.
    #[error("watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// A watched directory could not be prepared.
    #[error("IO error: {0}")]
    System(#[from] std::io::Error),

    /// A glob in the configuration is invalid.
    #[error("invalid pattern {pattern}: {message}")]
    Pattern {
        /// Offending glob.
        pattern: String,
        /// Parser message.
        message: String,
    },
}
