//! Event sources feeding the monitor.
//!
//! - push feed: job creation/modification notices ([`JobFeed`])
//! - poll loop: periodic enumeration of queued jobs ([`JobSource`])
//! - inbox: simulated job drops handed to a spooler ([`InboxSink`])
//!
//! Native bindings implement these traits; the workspace ships a simulated
//! spooler that implements all of them.

mod feed;
mod poll;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spoolguard_types::{AttributeMap, JobOperationKind};
use tokio::sync::mpsc;

pub use feed::{spawn_feed_pump, subscribe_with_fallback};
pub use poll::{PollReport, poll_once, spawn_poll_loop};

/// Subscription scope for the push feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Only print-job objects (preferred).
    Scoped,
    /// Every spooler notification, filtered locally.
    Unscoped,
}

impl FeedScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scoped => "scoped",
            Self::Unscoped => "unscoped",
        }
    }
}

/// One push notification.
#[derive(Debug, Clone)]
pub struct JobNotice {
    pub kind: JobOperationKind,
    pub attributes: AttributeMap,
}

/// A job returned by a poll.
#[derive(Debug, Clone)]
pub struct PolledJob {
    pub attributes: AttributeMap,
    pub submitted_at: DateTime<Utc>,
}

/// Push-style job notification feed.
#[async_trait]
pub trait JobFeed: Send + Sync {
    /// Open a subscription.
    ///
    /// # Errors
    ///
    /// The spooler refused the subscription.
    async fn subscribe(&self, scope: FeedScope) -> anyhow::Result<mpsc::Receiver<JobNotice>>;
}

/// Periodic enumeration of jobs currently queued.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// List queued jobs.
    ///
    /// # Errors
    ///
    /// The spooler could not be enumerated.
    async fn enumerate(&self) -> anyhow::Result<Vec<PolledJob>>;
}

/// Accepts simulated jobs dropped into the inbox.
#[async_trait]
pub trait InboxSink: Send + Sync {
    /// Submit a job described by its attributes.
    ///
    /// # Errors
    ///
    /// The job was rejected.
    async fn submit(&self, attributes: AttributeMap) -> anyhow::Result<()>;
}

/// Shared "push feed unavailable" flag; forces the poll loop on.
#[derive(Debug, Clone, Default)]
pub struct FeedHealth {
    degraded: Arc<AtomicBool>,
}

impl FeedHealth {
    pub fn mark_degraded(&self) {
        self.degraded.store(true, Ordering::SeqCst);
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }
}
