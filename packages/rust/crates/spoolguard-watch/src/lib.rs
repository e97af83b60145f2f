#![allow(clippy::doc_markdown)]

//! spoolguard-watch - Override markers and file-drop watching
//!
//! Two filesystem surfaces feed the monitor:
//!
//! - `responses/<job_id>.ok` override markers ("the user approved this job")
//! - `inbox/*.json` simulated job drops
//!
//! # Architecture
//!
//! ```text
//! spoolguard-watch/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # MarkerError, WatchError
//! ├── markers.rs  # OverrideStore (approve / is_approved / consume)
//! └── watcher.rs  # notify watcher → EventBus (marker/approved, inbox/job)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use spoolguard_watch::OverrideStore;
//!
//! let store = OverrideStore::new("/var/lib/spoolguard/responses");
//! store.approve("55")?;
//! assert!(store.is_approved("55"));
//! store.consume("55")?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
mod markers;
mod watcher;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::{MarkerError, WatchError};
pub use markers::{MARKER_EXTENSION, OverrideStore};
pub use watcher::{DropKind, DropWatcherHandle, WatcherConfig, classify_drop, start_drop_watcher};
