//! spoolguard-queue - Sequential side-effect queue
//!
//! Multi-producer, single-consumer FIFO of deferred actions. Producers
//! (feed callbacks, poll ticks, watcher events) never block; one consumer
//! task runs actions strictly in submission order.
//!
//! ```text
//! enqueue(label, action) ──► mpsc::unbounded ──► consumer task
//!                                                   │
//!                                   tokio::spawn(action()).await
//!                                                   │
//!                                   Ok / Err (logged) / panic (JoinError)
//! ```
//!
//! A failing or panicking action is logged and counted; the consumer keeps
//! going. `stop` closes the input, drains what was queued, and is idempotent.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type Action = Box<dyn FnOnce() -> ActionFuture + Send>;

struct QueuedAction {
    label: String,
    run: Action,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Actions accepted by `enqueue`.
    pub enqueued: u64,
    /// Actions that returned `Ok`.
    pub completed: u64,
    /// Actions that returned `Err` or panicked.
    pub failed: u64,
}

impl QueueStats {
    /// Accepted actions not finished yet.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }
}

/// Sequential work queue.
pub struct WorkQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<QueuedAction>>>,
    consumer: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("stats", &self.stats())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl WorkQueue {
    /// Start the consumer task on the current tokio runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let consumer = tokio::spawn(consume(rx, Arc::clone(&counters)));
        Self {
            tx: Mutex::new(Some(tx)),
            consumer: tokio::sync::Mutex::new(Some(consumer)),
            counters,
        }
    }

    /// Submit an action. Never blocks; returns `false` after `stop`.
    pub fn enqueue<F, Fut>(&self, label: impl Into<String>, action: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let queued = QueuedAction {
            label: label.clone(),
            run: Box::new(move || Box::pin(action()) as ActionFuture),
        };
        let Ok(guard) = self.tx.lock() else {
            tracing::warn!(action = %label, "work queue lock poisoned, dropping action");
            return false;
        };
        let Some(tx) = guard.as_ref() else {
            tracing::warn!(action = %label, "work queue stopped, dropping action");
            return false;
        };
        if tx.send(queued).is_err() {
            tracing::warn!(action = %label, "work queue consumer gone, dropping action");
            return false;
        }
        self.counters.enqueued.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Close the input, drain queued actions and wait for the consumer.
    ///
    /// Safe to call more than once; later calls wait for the first to finish.
    pub async fn stop(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
        let mut consumer = self.consumer.lock().await;
        if let Some(handle) = consumer.take()
            && let Err(error) = handle.await
        {
            tracing::error!("work queue consumer crashed: {error}");
        }
    }

    /// Whether `stop` was called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.tx.lock().map_or(true, |guard| guard.is_none())
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

async fn consume(mut rx: mpsc::UnboundedReceiver<QueuedAction>, counters: Arc<Counters>) {
    while let Some(QueuedAction { label, run }) = rx.recv().await {
        tracing::trace!(action = %label, "running queued action");
        match tokio::spawn(async move { run().await }).await {
            Ok(Ok(())) => {
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Err(error)) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(action = %label, error = %format!("{error:#}"), "queued action failed");
            }
            Err(error) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(action = %label, "queued action crashed: {error}");
            }
        }
    }
    tracing::debug!("work queue drained");
}
