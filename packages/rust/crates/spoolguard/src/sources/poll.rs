use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spoolguard_types::ObservationSource;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{FeedHealth, JobSource};
use crate::monitor::Monitor;
use crate::observability::MonitorEvent;

/// What one poll pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub seen: usize,
    pub too_old: usize,
    pub handled: usize,
    pub failed: usize,
}

/// Enumerate once and feed every job younger than `max_age` to the monitor.
pub async fn poll_once(source: &dyn JobSource, monitor: &Monitor, max_age: Duration) -> PollReport {
    let mut report = PollReport::default();
    let jobs = match source.enumerate().await {
        Ok(jobs) => jobs,
        Err(error) => {
            tracing::warn!(
                event = MonitorEvent::PollScanFailed.as_str(),
                error = %format!("{error:#}"),
                "queue poll failed"
            );
            return report;
        }
    };
    let now = Utc::now();
    let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
    for job in jobs {
        report.seen += 1;
        if now.signed_duration_since(job.submitted_at) > max_age {
            report.too_old += 1;
            tracing::trace!(submitted_at = %job.submitted_at, "skipping old job");
            continue;
        }
        match monitor.on_job_created(&job.attributes, ObservationSource::Poll) {
            Ok(_) => report.handled += 1,
            Err(error) => {
                report.failed += 1;
                tracing::error!(
                    event = MonitorEvent::HandlerFailed.as_str(),
                    source = ObservationSource::Poll.as_str(),
                    error = %format!("{error:#}"),
                    "job handler failed"
                );
            }
        }
    }
    monitor.suppressor().sweep(now);
    report
}

/// Periodic poll loop.
///
/// Scans when the scanner is enabled or the push feed is degraded. While
/// degraded, repeats a warning every `degraded_warning_interval`.
pub fn spawn_poll_loop(
    source: Arc<dyn JobSource>,
    monitor: Arc<Monitor>,
    health: FeedHealth,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let config = monitor.config().clone();
        let mut ticker = tokio::time::interval(config.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_warning: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = stop.changed() => break,
                _ = ticker.tick() => {
                    let degraded = health.is_degraded();
                    if degraded
                        && last_warning
                            .is_none_or(|at| at.elapsed() >= config.degraded_warning_interval)
                    {
                        tracing::warn!(
                            event = MonitorEvent::FeedDegraded.as_str(),
                            "job feed unavailable; running in poll-only mode"
                        );
                        last_warning = Some(Instant::now());
                    }
                    if !(config.enable_scanner || degraded) {
                        continue;
                    }
                    let report = poll_once(source.as_ref(), &monitor, config.job_age_threshold).await;
                    tracing::trace!(
                        seen = report.seen,
                        too_old = report.too_old,
                        handled = report.handled,
                        "poll pass finished"
                    );
                }
            }
        }
        tracing::debug!("poll loop stopped");
    })
}
