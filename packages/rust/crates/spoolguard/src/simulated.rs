//! In-process spooler.
//!
//! Stands in for the native bindings: it keeps a job table, reports new jobs
//! through a push feed and a poll listing, and answers every cancellation
//! capability. Jobs arrive through [`SimulatedSpooler::submit`] (the inbox
//! drop path and tests).

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spoolguard_cancel::{
    CancelError, JobFilter, JobRecord, NativeLocator, QueueDirectory, QueueInfo, QueueKind,
    QueuedJob, StructuredQuery,
};
use spoolguard_detect::resolve;
use spoolguard_types::{
    AttributeMap, AttributeSource, JobOperationKind, QueueLocation, fields,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::sources::{FeedScope, InboxSink, JobFeed, JobNotice, JobSource, PolledJob};

const FEED_CAPACITY: usize = 256;
const DEFAULT_QUEUE: &str = "Simulated";

/// A job held by the simulated spooler.
#[derive(Debug, Clone)]
pub struct SimulatedJob {
    pub queue: String,
    pub job_id: u32,
    pub native_path: String,
    pub attributes: AttributeMap,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    queues: Vec<QueueInfo>,
    jobs: Vec<SimulatedJob>,
    feeds: Vec<mpsc::Sender<JobNotice>>,
}

#[derive(Debug)]
pub struct SimulatedSpooler {
    state: Mutex<State>,
    next_id: AtomicU32,
    failing_subscriptions: AtomicUsize,
}

impl Default for SimulatedSpooler {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSpooler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU32::new(1),
            failing_subscriptions: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` feed subscriptions fail.
    pub fn fail_next_subscriptions(&self, count: usize) {
        self.failing_subscriptions.store(count, Ordering::SeqCst);
    }

    /// Register a queue up front.
    pub fn add_queue(&self, queue: QueueInfo) {
        if let Ok(mut state) = self.state.lock()
            && !state.queues.iter().any(|known| known.name == queue.name)
        {
            state.queues.push(queue);
        }
    }

    /// Snapshot of the job table.
    pub fn jobs(&self) -> Vec<SimulatedJob> {
        self.state
            .lock()
            .map(|state| state.jobs.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, job_id: u32) -> bool {
        self.state
            .lock()
            .is_ok_and(|state| state.jobs.iter().any(|job| job.job_id == job_id))
    }

    /// Add (or refresh) a job and announce it on every open feed.
    ///
    /// The queue and id come from `Name` (`"<queue>, <id>"`), then
    /// `HostPrintQueue` and `JobId`; missing parts are generated. Missing
    /// `Name` and `HostPrintQueue` are filled in; `JobId`, `__PATH` and
    /// `TimeSubmitted` are always set.
    ///
    /// # Errors
    ///
    /// The job table is poisoned.
    pub fn submit(&self, attributes: AttributeMap) -> anyhow::Result<SimulatedJob> {
        let identity = resolve(attributes.text(fields::NAME).as_deref());
        let host = attributes
            .text(fields::HOST_PRINT_QUEUE)
            .map(|host| QueueLocation::parse(&host))
            .unwrap_or_default();

        let queue = [identity.queue_name.as_str(), host.printer.as_str()]
            .into_iter()
            .find(|name| !name.is_empty())
            .unwrap_or(DEFAULT_QUEUE)
            .to_string();
        let job_id = identity
            .numeric_job_id()
            .or_else(|| {
                attributes
                    .integer(fields::JOB_ID)
                    .ok()
                    .flatten()
                    .and_then(|id| u32::try_from(id).ok())
            })
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst));

        let native_path = format!("sim://{queue}/{job_id}");
        let submitted_at = Utc::now();
        let mut attributes = attributes;
        if attributes.text(fields::NAME).is_none() {
            attributes.insert(fields::NAME, format!("{queue}, {job_id}"));
        }
        attributes.insert(fields::JOB_ID, job_id);
        attributes.insert(fields::NATIVE_PATH, native_path.clone());
        if attributes.text(fields::HOST_PRINT_QUEUE).is_none() {
            attributes.insert(fields::HOST_PRINT_QUEUE, queue.clone());
        }
        attributes.insert(fields::TIME_SUBMITTED, submitted_at.to_rfc3339());

        let job = SimulatedJob {
            queue: queue.clone(),
            job_id,
            native_path,
            attributes,
            submitted_at,
        };

        let Ok(mut state) = self.state.lock() else {
            bail!("simulated spooler state poisoned");
        };
        if !state.queues.iter().any(|known| known.answers_to(&queue)) {
            state.queues.push(QueueInfo {
                name: queue.clone(),
                kind: if host.is_network() {
                    QueueKind::Connection
                } else {
                    QueueKind::Local
                },
                server: host.server.clone(),
            });
        }
        let kind = match state
            .jobs
            .iter_mut()
            .find(|known| known.job_id == job_id && known.queue == queue)
        {
            Some(existing) => {
                existing.attributes = job.attributes.clone();
                JobOperationKind::Modified
            }
            None => {
                state.jobs.push(job.clone());
                JobOperationKind::Created
            }
        };
        state.feeds.retain(|feed| {
            let notice = JobNotice {
                kind,
                attributes: job.attributes.clone(),
            };
            !matches!(feed.try_send(notice), Err(TrySendError::Closed(_)))
        });
        tracing::debug!(queue = %queue, job_id, kind = ?kind, "simulated job submitted");
        Ok(job)
    }

    fn remove_where(&self, predicate: impl Fn(&SimulatedJob) -> bool) -> Result<(), CancelError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CancelError::Provider("simulated spooler state poisoned".to_string()))?;
        let Some(index) = state.jobs.iter().position(predicate) else {
            return Err(CancelError::NotFound("no such job".to_string()));
        };
        let job = state.jobs.remove(index);
        for feed in &state.feeds {
            let _ = feed.try_send(JobNotice {
                kind: JobOperationKind::Other,
                attributes: job.attributes.clone(),
            });
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<Vec<SimulatedJob>, CancelError> {
        self.state
            .lock()
            .map(|state| state.jobs.clone())
            .map_err(|_| CancelError::Provider("simulated spooler state poisoned".to_string()))
    }
}

fn record_of(job: &SimulatedJob) -> JobRecord {
    JobRecord {
        native_path: Some(job.native_path.clone()),
        job_id: Some(job.job_id),
        name: job.attributes.text(fields::NAME).unwrap_or_default(),
        host_queue: job
            .attributes
            .text(fields::HOST_PRINT_QUEUE)
            .unwrap_or_else(|| job.queue.clone()),
        owner: job.attributes.text(fields::OWNER).unwrap_or_default(),
        notify: job.attributes.text(fields::NOTIFY).unwrap_or_default(),
    }
}

#[async_trait]
impl NativeLocator for SimulatedSpooler {
    async fn delete(&self, native_path: &str) -> Result<(), CancelError> {
        self.remove_where(|job| job.native_path == native_path)
    }
}

#[async_trait]
impl QueueDirectory for SimulatedSpooler {
    async fn list_queues(&self) -> Result<Vec<QueueInfo>, CancelError> {
        self.state
            .lock()
            .map(|state| state.queues.clone())
            .map_err(|_| CancelError::Provider("simulated spooler state poisoned".to_string()))
    }

    async fn list_jobs(&self, queue: &QueueInfo) -> Result<Vec<QueuedJob>, CancelError> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|job| queue.answers_to(&job.queue))
            .map(|job| QueuedJob {
                job_id: job.job_id,
                title: job
                    .attributes
                    .text(fields::DOCUMENT)
                    .unwrap_or_else(|| job.attributes.text(fields::NAME).unwrap_or_default()),
                submitter: job.attributes.text(fields::OWNER).unwrap_or_default(),
            })
            .collect())
    }

    async fn cancel(&self, queue: &QueueInfo, job_id: u32) -> Result<(), CancelError> {
        self.remove_where(|job| job.job_id == job_id && queue.answers_to(&job.queue))
    }
}

#[async_trait]
impl StructuredQuery for SimulatedSpooler {
    async fn query(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, CancelError> {
        Ok(self
            .snapshot()?
            .iter()
            .map(record_of)
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn delete(&self, record: &JobRecord) -> Result<(), CancelError> {
        let native_path = record.native_path.as_deref();
        self.remove_where(|job| {
            native_path.is_some_and(|path| path == job.native_path)
                || record.job_id == Some(job.job_id)
        })
    }
}

#[async_trait]
impl JobFeed for SimulatedSpooler {
    async fn subscribe(&self, scope: FeedScope) -> anyhow::Result<mpsc::Receiver<JobNotice>> {
        let failing = self
            .failing_subscriptions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            bail!("{} subscription refused by simulated spooler", scope.as_str());
        }
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let Ok(mut state) = self.state.lock() else {
            bail!("simulated spooler state poisoned");
        };
        state.feeds.push(tx);
        Ok(rx)
    }
}

#[async_trait]
impl JobSource for SimulatedSpooler {
    async fn enumerate(&self) -> anyhow::Result<Vec<PolledJob>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .map(|job| PolledJob {
                attributes: job.attributes,
                submitted_at: job.submitted_at,
            })
            .collect())
    }
}

#[async_trait]
impl InboxSink for SimulatedSpooler {
    async fn submit(&self, attributes: AttributeMap) -> anyhow::Result<()> {
        SimulatedSpooler::submit(self, attributes).map(|_| ())
    }
}
