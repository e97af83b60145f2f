//! Cancellation fallback chain.

use std::sync::Arc;

use spoolguard_types::{JobObservation, QueueLocation};

use crate::error::CancelError;
use crate::filter::JobFilter;
use crate::provider::{NativeLocator, QueueDirectory, QueueInfo, QueuedJob, StructuredQuery};

/// Step of the chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelStep {
    /// Direct delete through the native locator.
    NativeLocator,
    /// Search the named queue (or every queue when none is known).
    QueueSearch,
    /// Scan every remaining queue for the numeric id.
    BroadScan,
    /// Filtered structured query.
    StructuredQuery,
}

impl CancelStep {
    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NativeLocator => "native_locator",
            Self::QueueSearch => "queue_search",
            Self::BroadScan => "broad_scan",
            Self::StructuredQuery => "structured_query",
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The job was cancelled.
    Cancelled,
    /// The step ran and found nothing to cancel.
    NoMatch,
    /// A provider failed.
    Failed(String),
    /// The step did not apply (missing input or provider).
    Skipped,
}

/// One logged attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAttempt {
    /// Step.
    pub step: CancelStep,
    /// What happened.
    pub result: AttemptResult,
}

/// Result of a full pass over the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOutcome {
    /// Some step cancelled the job.
    pub cancelled: bool,
    /// The step that succeeded.
    pub step: Option<CancelStep>,
    /// Every attempted or skipped step, in order.
    pub attempts: Vec<CancelAttempt>,
}

impl CancelOutcome {
    /// Label for the `JobCancelled` record.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.step {
            Some(step) if self.cancelled => step.as_str(),
            _ => "not_found",
        }
    }

    /// How many steps ran (skips excluded).
    #[must_use]
    pub fn steps_run(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.result != AttemptResult::Skipped)
            .count()
    }

    fn record(&mut self, step: CancelStep, result: AttemptResult) -> bool {
        let cancelled = result == AttemptResult::Cancelled;
        match &result {
            AttemptResult::Cancelled => {
                tracing::info!(step = step.as_str(), "cancellation step succeeded");
            }
            AttemptResult::Failed(error) => {
                tracing::debug!(step = step.as_str(), error = %error, "cancellation step failed");
            }
            AttemptResult::NoMatch | AttemptResult::Skipped => {
                tracing::debug!(step = step.as_str(), result = ?result, "cancellation step finished");
            }
        }
        self.attempts.push(CancelAttempt { step, result });
        if cancelled {
            self.cancelled = true;
            self.step = Some(step);
        }
        cancelled
    }
}

/// What to cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellationRequest {
    /// Native locator for direct deletion.
    pub native_path: Option<String>,
    /// Job id (numeric for most spoolers).
    pub job_id: String,
    /// Queue name; may be empty.
    pub queue_name: String,
    /// Submitting user; may be empty.
    pub owner: String,
    /// Host queue as reported, used when `queue_name` is empty.
    pub host_queue: Option<String>,
}

impl CancellationRequest {
    /// Request for an observed job.
    #[must_use]
    pub fn from_observation(observation: &JobObservation) -> Self {
        Self {
            native_path: observation.native_path.clone(),
            job_id: observation.job_id.clone(),
            queue_name: observation.queue_name.clone(),
            owner: observation.owner.clone(),
            host_queue: observation.host_queue.clone(),
        }
    }

    fn numeric_id(&self) -> Option<u32> {
        self.job_id.trim().parse().ok()
    }

    /// Queue to search first: `queue_name`, else the host queue's printer.
    fn target_queue(&self) -> Option<(String, Option<String>)> {
        let location = self
            .host_queue
            .as_deref()
            .map(QueueLocation::parse)
            .unwrap_or_default();
        let name = if self.queue_name.trim().is_empty() {
            location.printer
        } else {
            self.queue_name.trim().to_string()
        };
        (!name.is_empty()).then_some((name, location.server))
    }
}

/// Runs the cancellation chain over whichever providers are configured.
///
/// Missing providers make their step `Skipped`. The orchestrator does not
/// retry; one pass, first success wins.
#[derive(Clone, Default)]
pub struct CancellationOrchestrator {
    native: Option<Arc<dyn NativeLocator>>,
    directory: Option<Arc<dyn QueueDirectory>>,
    query: Option<Arc<dyn StructuredQuery>>,
}

impl std::fmt::Debug for CancellationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationOrchestrator")
            .field("native", &self.native.is_some())
            .field("directory", &self.directory.is_some())
            .field("query", &self.query.is_some())
            .finish()
    }
}

impl CancellationOrchestrator {
    /// Orchestrator with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native locator provider.
    #[must_use]
    pub fn with_native_locator(mut self, provider: Arc<dyn NativeLocator>) -> Self {
        self.native = Some(provider);
        self
    }

    /// Set the queue directory provider.
    #[must_use]
    pub fn with_queue_directory(mut self, provider: Arc<dyn QueueDirectory>) -> Self {
        self.directory = Some(provider);
        self
    }

    /// Set the structured query provider.
    #[must_use]
    pub fn with_structured_query(mut self, provider: Arc<dyn StructuredQuery>) -> Self {
        self.query = Some(provider);
        self
    }

    /// Boolean contract: `true` when some step cancelled the job.
    pub async fn cancel_job(
        &self,
        native_path: Option<&str>,
        job_id: &str,
        queue_name: &str,
        owner: &str,
    ) -> bool {
        let request = CancellationRequest {
            native_path: native_path.map(str::to_string),
            job_id: job_id.to_string(),
            queue_name: queue_name.to_string(),
            owner: owner.to_string(),
            host_queue: None,
        };
        self.cancel(&request).await.cancelled
    }

    /// Run the chain and report every attempt.
    pub async fn cancel(&self, request: &CancellationRequest) -> CancelOutcome {
        let mut outcome = CancelOutcome::default();

        let native = self.native_delete(request).await;
        if outcome.record(CancelStep::NativeLocator, native) {
            return outcome;
        }

        let searched = match self.directory.as_deref() {
            Some(directory) => {
                let (result, searched) = queue_search(directory, request).await;
                if outcome.record(CancelStep::QueueSearch, result) {
                    return outcome;
                }
                searched
            }
            None => {
                outcome.record(CancelStep::QueueSearch, AttemptResult::Skipped);
                Searched::Nothing
            }
        };

        let broad = match (self.directory.as_deref(), request.numeric_id(), &searched) {
            (Some(directory), Some(id), Searched::Named(names)) => {
                broad_scan(directory, id, names).await
            }
            _ => AttemptResult::Skipped,
        };
        if outcome.record(CancelStep::BroadScan, broad) {
            return outcome;
        }

        let structured = self.structured_delete(request).await;
        outcome.record(CancelStep::StructuredQuery, structured);
        outcome
    }

    async fn native_delete(&self, request: &CancellationRequest) -> AttemptResult {
        let (Some(native), Some(path)) = (
            self.native.as_deref(),
            request.native_path.as_deref().filter(|p| !p.trim().is_empty()),
        ) else {
            return AttemptResult::Skipped;
        };
        match native.delete(path).await {
            Ok(()) => AttemptResult::Cancelled,
            Err(error) => failed(&error),
        }
    }

    async fn structured_delete(&self, request: &CancellationRequest) -> AttemptResult {
        let Some(query) = self.query.as_deref() else {
            return AttemptResult::Skipped;
        };
        let queue_name = request
            .target_queue()
            .map(|(name, _)| name)
            .unwrap_or_default();
        let Some(filter) = JobFilter::build(&request.job_id, &queue_name, &request.owner) else {
            return AttemptResult::Skipped;
        };
        tracing::debug!(filter = %filter, "structured query");
        let records = match query.query(&filter).await {
            Ok(records) => records,
            Err(error) => return failed(&error),
        };
        let Some(record) = records.iter().find(|record| filter.is_consistent(record)) else {
            return AttemptResult::NoMatch;
        };
        match query.delete(record).await {
            Ok(()) => AttemptResult::Cancelled,
            Err(error) => failed(&error),
        }
    }
}

/// What the queue-search step covered.
enum Searched {
    Nothing,
    Named(Vec<String>),
    Everything,
}

async fn queue_search(
    directory: &dyn QueueDirectory,
    request: &CancellationRequest,
) -> (AttemptResult, Searched) {
    let listed = directory.list_queues().await;
    let target = request.target_queue();

    let (candidates, searched) = match (&target, listed) {
        (Some((name, server)), listed) => {
            let mut candidates: Vec<QueueInfo> = listed
                .unwrap_or_default()
                .into_iter()
                .filter(|queue| queue.answers_to(name))
                .collect();
            if let Some(server) = server {
                candidates.sort_by_key(|queue| {
                    !queue
                        .server
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(server))
                });
            }
            if candidates.is_empty() {
                candidates.push(QueueInfo {
                    name: name.clone(),
                    kind: if server.is_some() {
                        crate::QueueKind::Connection
                    } else {
                        crate::QueueKind::Local
                    },
                    server: server.clone(),
                });
            }
            let names = candidates.iter().map(|queue| queue.name.clone()).collect();
            (candidates, Searched::Named(names))
        }
        (None, Ok(all)) => (all, Searched::Everything),
        (None, Err(error)) => return (failed(&error), Searched::Nothing),
    };

    let mut last_error = None;
    for queue in &candidates {
        let jobs = match directory.list_jobs(queue).await {
            Ok(jobs) => jobs,
            Err(error) => {
                tracing::debug!(queue = %queue.name, error = %error, "list_jobs failed");
                last_error = Some(error);
                continue;
            }
        };
        if let Some(job_id) = find_match(&jobs, request) {
            let result = match directory.cancel(queue, job_id).await {
                Ok(()) => AttemptResult::Cancelled,
                Err(error) => failed(&error),
            };
            return (result, searched);
        }
    }
    let result = last_error.map_or(AttemptResult::NoMatch, |error| failed(&error));
    (result, searched)
}

async fn broad_scan(directory: &dyn QueueDirectory, job_id: u32, skip: &[String]) -> AttemptResult {
    let queues = match directory.list_queues().await {
        Ok(queues) => queues,
        Err(error) => return failed(&error),
    };
    let mut last_error = None;
    for queue in queues
        .iter()
        .filter(|queue| !skip.iter().any(|name| name.eq_ignore_ascii_case(&queue.name)))
    {
        match directory.list_jobs(queue).await {
            Ok(jobs) if jobs.iter().any(|job| job.job_id == job_id) => {
                return match directory.cancel(queue, job_id).await {
                    Ok(()) => AttemptResult::Cancelled,
                    Err(error) => failed(&error),
                };
            }
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(queue = %queue.name, error = %error, "list_jobs failed");
                last_error = Some(error);
            }
        }
    }
    last_error.map_or(AttemptResult::NoMatch, |error| failed(&error))
}

/// Match order: numeric id, title containing the id, submitter equal to the
/// owner, title containing the owner.
fn find_match(jobs: &[QueuedJob], request: &CancellationRequest) -> Option<u32> {
    let id_text = request.job_id.trim();
    let owner = request.owner.trim();

    if let Some(id) = request.numeric_id()
        && let Some(job) = jobs.iter().find(|job| job.job_id == id)
    {
        return Some(job.job_id);
    }
    if !id_text.is_empty()
        && let Some(job) = jobs.iter().find(|job| job.title.contains(id_text))
    {
        return Some(job.job_id);
    }
    if owner.is_empty() {
        return None;
    }
    jobs.iter()
        .find(|job| job.submitter.eq_ignore_ascii_case(owner))
        .or_else(|| {
            let owner = owner.to_lowercase();
            jobs.iter()
                .find(|job| job.title.to_lowercase().contains(&owner))
        })
        .map(|job| job.job_id)
}

fn failed(error: &CancelError) -> AttemptResult {
    AttemptResult::Failed(error.to_string())
}
