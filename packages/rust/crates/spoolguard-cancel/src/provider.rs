//! Capability traits implemented by spooler bindings.
//!
//! The orchestrator only ever talks to these traits; native bindings and the
//! in-process simulated spooler both implement them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CancelError;
use crate::filter::JobFilter;

/// How a queue is attached to this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    /// Local printer.
    Local,
    /// Local printer shared with the network.
    Shared,
    /// Connection to a printer on a remote server.
    Connection,
}

/// A print queue as listed by a [`QueueDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    /// Queue (printer) name.
    pub name: String,
    /// Attachment kind.
    pub kind: QueueKind,
    /// Hosting server for connections.
    pub server: Option<String>,
}

impl QueueInfo {
    /// Local queue.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: QueueKind::Local,
            server: None,
        }
    }

    /// Whether this queue answers to `name` (full name or last `\` segment,
    /// ASCII case-insensitive).
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.name.eq_ignore_ascii_case(name)
            || spoolguard_types::QueueLocation::last_segment(&self.name)
                .eq_ignore_ascii_case(spoolguard_types::QueueLocation::last_segment(name))
    }
}

/// A job inside a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedJob {
    /// Numeric job identifier.
    pub job_id: u32,
    /// Job title.
    pub title: String,
    /// Submitting user.
    pub submitter: String,
}

/// A job record returned by a [`StructuredQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Native locator of the record.
    pub native_path: Option<String>,
    /// Numeric job identifier.
    pub job_id: Option<u32>,
    /// Composite job name.
    pub name: String,
    /// Host queue.
    pub host_queue: String,
    /// Submitting user.
    pub owner: String,
    /// User to notify.
    pub notify: String,
}

/// Direct deletion through an opaque native locator.
#[async_trait]
pub trait NativeLocator: Send + Sync {
    /// Delete the job the locator points at.
    async fn delete(&self, native_path: &str) -> Result<(), CancelError>;
}

/// Queue enumeration and per-queue cancel.
#[async_trait]
pub trait QueueDirectory: Send + Sync {
    /// All queues reachable from this machine.
    async fn list_queues(&self) -> Result<Vec<QueueInfo>, CancelError>;

    /// Jobs currently in `queue`.
    async fn list_jobs(&self, queue: &QueueInfo) -> Result<Vec<QueuedJob>, CancelError>;

    /// Cancel one job in `queue`.
    async fn cancel(&self, queue: &QueueInfo, job_id: u32) -> Result<(), CancelError>;
}

/// Filtered structured query over all jobs.
#[async_trait]
pub trait StructuredQuery: Send + Sync {
    /// Records satisfying `filter`.
    async fn query(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, CancelError>;

    /// Delete a record returned by [`StructuredQuery::query`].
    async fn delete(&self, record: &JobRecord) -> Result<(), CancelError>;
}
