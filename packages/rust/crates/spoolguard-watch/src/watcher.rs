//! File-drop watcher with event bus integration.
//!
//! Uses `notify` for cross-platform monitoring of the marker and inbox
//! directories and publishes one bus event per relevant file:
//!
//! - `*.ok`   → `marker/approved` (`{path, job_id}`)
//! - `*.json` → `inbox/job` (`{path}`)
//!
//! The notify callback only forwards into a channel; classification and
//! publishing run on a tokio task so no filesystem thread ever blocks on the
//! pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::json;
use spoolguard_events::{EventBus, SpoolEvent, sources, topics};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::markers::OverrideStore;

/// Configuration for the drop watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directories to watch; created when missing.
    pub paths: Vec<PathBuf>,
    /// Patterns to exclude (partial writes, editor droppings).
    pub exclude: Vec<String>,
    /// Window in which repeated events for one path collapse.
    pub debounce_ms: u64,
    /// Publish files already present when the watcher starts.
    pub publish_existing: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            paths: vec![],
            exclude: vec![
                "**/*.tmp".to_string(),
                "**/*.swp".to_string(),
                "**/~*".to_string(),
            ],
            debounce_ms: 100,
            publish_existing: true,
        }
    }
}

/// What a dropped file means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    /// Override marker (`*.ok`).
    Marker,
    /// Simulated job (`*.json`).
    Inbox,
}

/// Handle to control the drop watcher
#[derive(Debug)]
pub struct DropWatcherHandle {
    tx: mpsc::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DropWatcherHandle {
    /// Stop the watcher and wait for its task to exit.
    pub async fn stop(&self) {
        let _ = self.tx.send(()).await;
        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task
            && let Err(error) = task.await
        {
            tracing::error!("drop watcher task crashed: {error}");
        }
    }
}

struct DropClassifier {
    marker: GlobSet,
    inbox: GlobSet,
    exclude: GlobSet,
}

impl DropClassifier {
    fn new(exclude: &[String]) -> Result<Self, WatchError> {
        Ok(Self {
            marker: build_set(&["**/*.ok", "*.ok"])?,
            inbox: build_set(&["**/*.json", "*.json"])?,
            exclude: build_set(exclude)?,
        })
    }

    fn classify(&self, path: &Path) -> Option<DropKind> {
        let lowered = path.to_string_lossy().to_lowercase();
        if self.exclude.is_match(&lowered) {
            return None;
        }
        if self.marker.is_match(&lowered) {
            Some(DropKind::Marker)
        } else if self.inbox.is_match(&lowered) {
            Some(DropKind::Inbox)
        } else {
            None
        }
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, WatchError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|error| WatchError::Pattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|error| WatchError::Pattern {
        pattern: String::new(),
        message: error.to_string(),
    })
}

/// Classify a path with the default exclusions.
#[must_use]
pub fn classify_drop(path: &Path) -> Option<DropKind> {
    DropClassifier::new(&WatcherConfig::default().exclude)
        .ok()
        .and_then(|classifier| classifier.classify(path))
}

fn drop_event(kind: DropKind, path: &Path) -> Option<SpoolEvent> {
    let path_str = path.to_string_lossy().to_string();
    match kind {
        DropKind::Marker => {
            let job_id = OverrideStore::job_id_of(path)?;
            Some(SpoolEvent::new(
                sources::WATCHER,
                topics::MARKER_APPROVED,
                json!({ "path": path_str, "job_id": job_id }),
            ))
        }
        DropKind::Inbox => Some(SpoolEvent::file_event(
            sources::WATCHER,
            topics::INBOX_JOB,
            &path_str,
        )),
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Start a drop watcher that publishes to `bus`.
///
/// # Errors
///
/// A watched directory cannot be created, a pattern is invalid, or the
/// platform watcher cannot attach.
pub fn start_drop_watcher(
    config: WatcherConfig,
    bus: EventBus,
) -> Result<DropWatcherHandle, WatchError> {
    let classifier = DropClassifier::new(&config.exclude)?;
    let debounce = Duration::from_millis(config.debounce_ms);

    let (tx, mut rx) = mpsc::channel(1);
    let (watcher_tx, mut watcher_rx) = mpsc::channel(256);

    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| {
            let _ = watcher_tx.blocking_send(result);
        },
        Config::default().with_poll_interval(Duration::from_millis(50)),
    )?;

    let mut existing = Vec::new();
    for path in &config.paths {
        std::fs::create_dir_all(path)?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        if config.publish_existing {
            existing.extend(existing_files(path));
        }
    }

    for path in existing {
        if let Some(event) = classifier
            .classify(&path)
            .and_then(|kind| drop_event(kind, &path))
        {
            bus.publish(event);
        }
    }

    let task = tokio::spawn(async move {
        // Keep watcher alive by moving it into this task
        let _watcher = watcher;
        let mut last_seen: HashMap<PathBuf, Instant> = HashMap::new();

        loop {
            tokio::select! {
                _ = rx.recv() => break,
                result = watcher_rx.recv() => {
                    match result {
                        Some(Ok(event)) => {
                            if !is_relevant(&event.kind) {
                                continue;
                            }
                            for path in &event.paths {
                                let Some(kind) = classifier.classify(path) else {
                                    continue;
                                };
                                if !path.is_file() {
                                    continue;
                                }
                                let now = Instant::now();
                                if last_seen
                                    .get(path)
                                    .is_some_and(|last| now.duration_since(*last) < debounce)
                                {
                                    continue;
                                }
                                last_seen.insert(path.clone(), now);
                                if let Some(spool_event) = drop_event(kind, path) {
                                    tracing::debug!(
                                        path = %path.display(),
                                        topic = %spool_event.topic,
                                        "file drop"
                                    );
                                    bus.publish(spool_event);
                                }
                            }
                            last_seen.retain(|_, seen| seen.elapsed() < debounce * 10);
                        }
                        Some(Err(error)) => {
                            tracing::warn!(error = %error, "drop watcher error");
                        }
                        None => break,
                    }
                }
            }
        }
        tracing::debug!("drop watcher stopped");
    });

    Ok(DropWatcherHandle {
        tx,
        task: Mutex::new(Some(task)),
    })
}

fn existing_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
