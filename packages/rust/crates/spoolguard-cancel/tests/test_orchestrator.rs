//! Cancellation chain tests with counting doubles.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use spoolguard_cancel::{
    AttemptResult, CancelError, CancelStep, CancellationOrchestrator, CancellationRequest,
    JobFilter, JobRecord, NativeLocator, QueueDirectory, QueueInfo, QueueKind, QueuedJob,
    StructuredQuery,
};

struct CountingLocator {
    calls: AtomicUsize,
    result: Result<(), CancelError>,
}

impl CountingLocator {
    fn new(result: Result<(), CancelError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result,
        })
    }
}

#[async_trait]
impl NativeLocator for CountingLocator {
    async fn delete(&self, _native_path: &str) -> Result<(), CancelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[derive(Default)]
struct FakeDirectory {
    queues: Vec<QueueInfo>,
    jobs: Mutex<HashMap<String, Vec<QueuedJob>>>,
    list_queue_calls: AtomicUsize,
    list_job_calls: AtomicUsize,
    cancelled: Mutex<Vec<(String, u32)>>,
}

impl FakeDirectory {
    fn with_queue(mut self, queue: QueueInfo, jobs: Vec<QueuedJob>) -> Self {
        if let Ok(mut map) = self.jobs.lock() {
            map.insert(queue.name.clone(), jobs);
        }
        self.queues.push(queue);
        self
    }

    fn cancelled(&self) -> Vec<(String, u32)> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueDirectory for FakeDirectory {
    async fn list_queues(&self) -> Result<Vec<QueueInfo>, CancelError> {
        self.list_queue_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.queues.clone())
    }

    async fn list_jobs(&self, queue: &QueueInfo) -> Result<Vec<QueuedJob>, CancelError> {
        self.list_job_calls.fetch_add(1, Ordering::SeqCst);
        self.jobs
            .lock()
            .unwrap()
            .get(&queue.name)
            .cloned()
            .ok_or_else(|| CancelError::NotFound(queue.name.clone()))
    }

    async fn cancel(&self, queue: &QueueInfo, job_id: u32) -> Result<(), CancelError> {
        self.cancelled
            .lock()
            .unwrap()
            .push((queue.name.clone(), job_id));
        Ok(())
    }
}

#[derive(Default)]
struct FakeQuery {
    records: Vec<JobRecord>,
    queries: Mutex<Vec<JobFilter>>,
    deleted: Mutex<Vec<JobRecord>>,
}

#[async_trait]
impl StructuredQuery for FakeQuery {
    async fn query(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, CancelError> {
        self.queries.lock().unwrap().push(filter.clone());
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn delete(&self, record: &JobRecord) -> Result<(), CancelError> {
        self.deleted.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn job(job_id: u32, title: &str, submitter: &str) -> QueuedJob {
    QueuedJob {
        job_id,
        title: title.to_string(),
        submitter: submitter.to_string(),
    }
}

fn request(native_path: Option<&str>, job_id: &str, queue: &str, owner: &str) -> CancellationRequest {
    CancellationRequest {
        native_path: native_path.map(str::to_string),
        job_id: job_id.to_string(),
        queue_name: queue.to_string(),
        owner: owner.to_string(),
        host_queue: None,
    }
}

#[tokio::test]
async fn test_native_success_short_circuits() {
    let locator = CountingLocator::new(Ok(()));
    let directory = Arc::new(FakeDirectory::default().with_queue(
        QueueInfo::local("Shared"),
        vec![job(55, "Shared, 55", "anna")],
    ));
    let query = Arc::new(FakeQuery::default());
    let orchestrator = CancellationOrchestrator::new()
        .with_native_locator(locator.clone())
        .with_queue_directory(directory.clone())
        .with_structured_query(query.clone());

    let outcome = orchestrator
        .cancel(&request(Some("job:55"), "55", "Shared", "anna"))
        .await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.step, Some(CancelStep::NativeLocator));
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(locator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(directory.list_queue_calls.load(Ordering::SeqCst), 0);
    assert_eq!(directory.list_job_calls.load(Ordering::SeqCst), 0);
    assert!(query.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_native_failure_falls_through_to_queue_search() {
    let locator = CountingLocator::new(Err(CancelError::AccessDenied("job:55".into())));
    let directory = Arc::new(FakeDirectory::default().with_queue(
        QueueInfo::local("Shared"),
        vec![job(54, "Shared, 54", "bruno"), job(55, "Shared, 55", "anna")],
    ));
    let orchestrator = CancellationOrchestrator::new()
        .with_native_locator(locator.clone())
        .with_queue_directory(directory.clone());

    let outcome = orchestrator
        .cancel(&request(Some("job:55"), "55", "Shared", "anna"))
        .await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.step, Some(CancelStep::QueueSearch));
    assert!(matches!(outcome.attempts[0].result, AttemptResult::Failed(_)));
    assert_eq!(directory.cancelled(), vec![("Shared".to_string(), 55)]);
}

#[tokio::test]
async fn test_broad_scan_finds_job_on_other_queue() {
    let directory = Arc::new(
        FakeDirectory::default()
            .with_queue(QueueInfo::local("Office"), vec![job(3, "Office, 3", "carla")])
            .with_queue(
                QueueInfo {
                    name: r"\\srv\Floor2".to_string(),
                    kind: QueueKind::Connection,
                    server: Some("srv".to_string()),
                },
                vec![job(90, "Floor2, 90", "dario")],
            ),
    );
    let orchestrator = CancellationOrchestrator::new().with_queue_directory(directory.clone());

    let outcome = orchestrator.cancel(&request(None, "90", "Office", "")).await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.step, Some(CancelStep::BroadScan));
    assert_eq!(outcome.attempts[0].result, AttemptResult::Skipped);
    assert_eq!(outcome.attempts[1].result, AttemptResult::NoMatch);
    assert_eq!(directory.cancelled(), vec![(r"\\srv\Floor2".to_string(), 90)]);
}

#[tokio::test]
async fn test_structured_query_requires_owner_consistency() {
    let query = Arc::new(FakeQuery {
        records: vec![
            JobRecord {
                name: "Office, report".to_string(),
                owner: "bruno".to_string(),
                ..JobRecord::default()
            },
            JobRecord {
                name: "Office, report".to_string(),
                owner: "anna".to_string(),
                native_path: Some("rec:2".to_string()),
                ..JobRecord::default()
            },
        ],
        ..FakeQuery::default()
    });
    let orchestrator = CancellationOrchestrator::new().with_structured_query(query.clone());

    let outcome = orchestrator
        .cancel(&request(None, "report-x", "Office", "anna"))
        .await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.step, Some(CancelStep::StructuredQuery));
    let deleted = query.deleted.lock().unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].native_path.as_deref(), Some("rec:2"));
}

#[tokio::test]
async fn test_exhaustion_returns_false() {
    let directory = Arc::new(
        FakeDirectory::default().with_queue(QueueInfo::local("Office"), vec![job(1, "x", "y")]),
    );
    let query = Arc::new(FakeQuery::default());
    let orchestrator = CancellationOrchestrator::new()
        .with_queue_directory(directory)
        .with_structured_query(query.clone());

    assert!(!orchestrator.cancel_job(None, "77", "Office", "").await);
    assert_eq!(
        query.queries.lock().unwrap().as_slice(),
        &[JobFilter::ById(77)]
    );
}

#[tokio::test]
async fn test_no_providers_skips_everything() {
    let outcome = CancellationOrchestrator::new()
        .cancel(&request(Some("p"), "1", "Q", "o"))
        .await;
    assert!(!outcome.cancelled);
    assert_eq!(outcome.steps_run(), 0);
    assert_eq!(outcome.label(), "not_found");
    assert_eq!(outcome.attempts.len(), 4);
}
