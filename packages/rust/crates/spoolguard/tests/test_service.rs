//! Whole-service runs against the simulated spooler.

use std::sync::Arc;
use std::time::Duration;

use spoolguard::{
    MonitorConfig, Service, ServiceDeps, SimulatedJobSpec, SimulatedSpooler, approve_job,
    write_simulated_job,
};
use spoolguard_events::topics;
use spoolguard_types::AttributeMap;
use tempfile::TempDir;

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

fn config(tmp: &TempDir) -> MonitorConfig {
    let mut config = MonitorConfig::new(tmp.path());
    config.scan_interval = Duration::from_secs(1);
    config
}

async fn start(tmp: &TempDir) -> (Service, Arc<SimulatedSpooler>) {
    let config = config(tmp);
    let spooler = Arc::new(SimulatedSpooler::new());
    let deps = ServiceDeps::simulated(&spooler, &config);
    let service = Service::start(config, deps).await.unwrap();
    (service, spooler)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feed_job_is_cancelled() {
    let tmp = TempDir::new().unwrap();
    let (service, spooler) = start(&tmp).await;
    assert!(!service.is_degraded());
    let mut events = service.bus().subscribe();

    spooler
        .submit(
            AttributeMap::new()
                .with("Name", "Shared, 55")
                .with("Copies", 5)
                .with("Owner", "mrossi"),
        )
        .unwrap();
    assert!(wait_until(|| !spooler.contains(55)).await);

    let cancelled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if event.topic == topics::JOB_CANCELLED => return event,
                Ok(_) => {}
                Err(error) => panic!("bus closed: {error}"),
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(cancelled.job_id(), Some("55"));
    assert_eq!(cancelled.payload["outcome"], "native_locator");

    let stats = service.shutdown().await;
    assert!(stats.completed >= 1);
    assert_eq!(stats.pending(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_copy_job_survives() {
    let tmp = TempDir::new().unwrap();
    let (service, spooler) = start(&tmp).await;

    spooler
        .submit(AttributeMap::new().with("Name", "Shared, 8").with("Copies", 1))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(spooler.contains(8));
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_approved_job_survives() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    approve_job(&config.layout, "56").unwrap();
    let (service, spooler) = start(&tmp).await;

    spooler
        .submit(AttributeMap::new().with("Name", "Shared, 56").with("Copies", 4))
        .unwrap();
    assert!(wait_until(|| service.monitor().suppressor().is_approved("56")).await);
    service.shutdown().await;
    assert!(spooler.contains(56));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inbox_drop_goes_through_simulated_spooler() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let dropped = write_simulated_job(
        &config.layout,
        &SimulatedJobSpec {
            queue: "Office".to_string(),
            job_id: 77,
            copies: Some(3),
            document: Some("minutes.docx".to_string()),
            owner: Some("lbianchi".to_string()),
            ..SimulatedJobSpec::default()
        },
    )
    .unwrap();

    let (service, spooler) = start(&tmp).await;

    assert!(wait_until(|| service.monitor().suppressor().is_observed("77")).await);
    assert!(wait_until(|| !spooler.contains(77)).await);
    assert!(wait_until(|| !dropped.exists()).await);
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feed_failure_enters_poll_only_mode() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let spooler = Arc::new(SimulatedSpooler::new());
    spooler.fail_next_subscriptions(2);
    let deps = ServiceDeps::simulated(&spooler, &config);
    let service = Service::start(config, deps).await.unwrap();
    assert!(service.is_degraded());

    spooler
        .submit(AttributeMap::new().with("Name", "Shared, 90").with("Copies", 2))
        .unwrap();
    assert!(wait_until(|| !spooler.contains(90)).await);
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_only_mode_ignores_disabled_scanner() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(&tmp);
    config.enable_scanner = false;
    let spooler = Arc::new(SimulatedSpooler::new());
    spooler.fail_next_subscriptions(2);
    let deps = ServiceDeps::simulated(&spooler, &config);
    let service = Service::start(config, deps).await.unwrap();

    spooler
        .submit(AttributeMap::new().with("Name", "Shared, 91").with("Copies", 2))
        .unwrap();
    assert!(wait_until(|| !spooler.contains(91)).await);
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unscoped_fallback_keeps_feed() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(&tmp);
    config.enable_scanner = false;
    let spooler = Arc::new(SimulatedSpooler::new());
    spooler.fail_next_subscriptions(1);
    let deps = ServiceDeps::simulated(&spooler, &config);
    let service = Service::start(config, deps).await.unwrap();
    assert!(!service.is_degraded());

    spooler
        .submit(AttributeMap::new().with("Name", "Shared, 92").with("Copies", 2))
        .unwrap();
    assert!(wait_until(|| !spooler.contains(92)).await);
    service.shutdown().await;
}
