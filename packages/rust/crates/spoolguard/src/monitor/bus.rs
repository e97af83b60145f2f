//! Bus pump: reacts to file drops published by the watcher.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use spoolguard_events::{SpoolEvent, TopicSubscription, topics};
use spoolguard_types::AttributeMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::Monitor;
use crate::observability::MonitorEvent;
use crate::sources::InboxSink;

/// Drain `events` until stopped.
///
/// `events` should be filtered to [`topics::DROP_TOPICS`] and must be
/// subscribed before the watcher starts so files present at
/// startup are not missed.
pub fn spawn_bus_pump(
    monitor: Arc<Monitor>,
    inbox: Arc<dyn InboxSink>,
    mut events: TopicSubscription,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.changed() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        if let Err(error) = handle_event(&monitor, inbox.as_ref(), &event).await {
                            tracing::error!(
                                event = MonitorEvent::HandlerFailed.as_str(),
                                topic = %event.topic,
                                error = %format!("{error:#}"),
                                "bus event handler failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "bus pump lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("bus pump stopped");
    })
}

async fn handle_event(
    monitor: &Monitor,
    inbox: &dyn InboxSink,
    event: &SpoolEvent,
) -> anyhow::Result<()> {
    match event.topic.as_str() {
        topics::MARKER_APPROVED => {
            let Some(job_id) = event.job_id() else {
                return Ok(());
            };
            monitor.accept_override(job_id);
            monitor.queue_marker_cleanup(job_id);
            Ok(())
        }
        topics::INBOX_JOB => {
            let Some(path) = event.path() else {
                return Ok(());
            };
            submit_drop(monitor, inbox, PathBuf::from(path)).await
        }
        _ => Ok(()),
    }
}

async fn submit_drop(monitor: &Monitor, inbox: &dyn InboxSink, path: PathBuf) -> anyhow::Result<()> {
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::trace!(path = %path.display(), "inbox file already consumed");
            return Ok(());
        }
        Err(error) => {
            return Err(error).with_context(|| format!("read inbox file {}", path.display()));
        }
    };

    let attrs = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value @ serde_json::Value::Object(_)) => AttributeMap::from_json(value),
        Ok(_) => {
            reject(&path, "not a JSON object");
            return Ok(());
        }
        Err(error) => {
            reject(&path, &error.to_string());
            return Ok(());
        }
    };

    inbox
        .submit(attrs)
        .await
        .with_context(|| format!("submit inbox job {}", path.display()))?;

    let label = format!("remove inbox file {}", path.display());
    monitor.queue().enqueue(label, move || async move {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => {
                Err(error).with_context(|| format!("remove inbox file {}", path.display()))
            }
        }
    });
    Ok(())
}

fn reject(path: &std::path::Path, reason: &str) {
    tracing::warn!(
        event = MonitorEvent::InboxJobRejected.as_str(),
        path = %path.display(),
        reason,
        "inbox file is not a job description"
    );
}
