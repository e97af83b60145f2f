use std::sync::Arc;

use spoolguard_types::ObservationSource;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{FeedHealth, FeedScope, JobFeed, JobNotice};
use crate::monitor::Monitor;
use crate::observability::MonitorEvent;

/// Subscribe scoped, then once unscoped. `None` means poll-only mode.
pub async fn subscribe_with_fallback(
    feed: &dyn JobFeed,
) -> Option<(FeedScope, mpsc::Receiver<JobNotice>)> {
    for scope in [FeedScope::Scoped, FeedScope::Unscoped] {
        match feed.subscribe(scope).await {
            Ok(rx) => {
                tracing::info!(scope = scope.as_str(), "job feed subscribed");
                return Some((scope, rx));
            }
            Err(error) => {
                tracing::error!(
                    event = MonitorEvent::FeedSubscriptionFailed.as_str(),
                    scope = scope.as_str(),
                    error = %format!("{error:#}"),
                    "job feed subscription failed"
                );
            }
        }
    }
    None
}

/// Drain feed notices into the monitor until stopped or the feed closes.
pub fn spawn_feed_pump(
    monitor: Arc<Monitor>,
    mut notices: mpsc::Receiver<JobNotice>,
    health: FeedHealth,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.changed() => break,
                notice = notices.recv() => {
                    let Some(notice) = notice else {
                        health.mark_degraded();
                        tracing::warn!(
                            event = MonitorEvent::FeedDegraded.as_str(),
                            "job feed closed; continuing in poll-only mode"
                        );
                        break;
                    };
                    if let Err(error) = monitor
                        .on_job_operation(&notice.attributes, notice.kind, ObservationSource::Feed)
                    {
                        tracing::error!(
                            event = MonitorEvent::HandlerFailed.as_str(),
                            source = ObservationSource::Feed.as_str(),
                            error = %format!("{error:#}"),
                            "job handler failed"
                        );
                    }
                }
            }
        }
        tracing::debug!("feed pump stopped");
    })
}
