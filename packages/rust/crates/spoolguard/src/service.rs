//! Service lifetime: wires sources, pumps, watcher and queue together.

use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use spoolguard_cancel::CancellationOrchestrator;
use spoolguard_events::{EventBus, sources, topics};
use spoolguard_queue::{QueueStats, WorkQueue};
use spoolguard_watch::{DropWatcherHandle, WatcherConfig, start_drop_watcher};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::MonitorConfig;
use crate::monitor::{Monitor, spawn_bus_pump};
use crate::notifier::{LogNotifier, Notifier};
use crate::observability::MonitorEvent;
use crate::simulated::SimulatedSpooler;
use crate::sources::{
    FeedHealth, InboxSink, JobFeed, JobSource, spawn_feed_pump, spawn_poll_loop,
    subscribe_with_fallback,
};

/// Capabilities the service runs against.
pub struct ServiceDeps {
    pub feed: Arc<dyn JobFeed>,
    pub source: Arc<dyn JobSource>,
    pub inbox: Arc<dyn InboxSink>,
    pub orchestrator: CancellationOrchestrator,
    pub notifier: Arc<dyn Notifier>,
}

impl ServiceDeps {
    /// Every capability backed by one simulated spooler.
    pub fn simulated(spooler: &Arc<SimulatedSpooler>, config: &MonitorConfig) -> Self {
        let orchestrator = CancellationOrchestrator::new()
            .with_native_locator(spooler.clone())
            .with_queue_directory(spooler.clone())
            .with_structured_query(spooler.clone());
        Self {
            feed: spooler.clone(),
            source: spooler.clone(),
            inbox: spooler.clone(),
            orchestrator,
            notifier: Arc::new(LogNotifier::new(config.language)),
        }
    }
}

struct Stoppable {
    name: &'static str,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Stoppable {
    async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(error) = self.task.await {
            tracing::error!("{} crashed: {error}", self.name);
        }
    }
}

fn spawn_stoppable(
    name: &'static str,
    spawn: impl FnOnce(watch::Receiver<bool>) -> JoinHandle<()>,
) -> Stoppable {
    let (stop, rx) = watch::channel(false);
    Stoppable {
        name,
        stop,
        task: spawn(rx),
    }
}

/// A running monitor.
pub struct Service {
    monitor: Arc<Monitor>,
    bus: EventBus,
    queue: Arc<WorkQueue>,
    health: FeedHealth,
    watcher: Option<DropWatcherHandle>,
    poll: Stoppable,
    feed: Option<Stoppable>,
    bus_pump: Stoppable,
}

impl Service {
    /// Start everything.
    ///
    /// A failed feed subscription or watcher leaves the service running in a
    /// degraded mode; neither is an error.
    ///
    /// # Errors
    ///
    /// The data directory layout cannot be created.
    pub async fn start(config: MonitorConfig, deps: ServiceDeps) -> anyhow::Result<Self> {
        let layout = &config.layout;
        for dir in [layout.responses_dir(), layout.inbox_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create data directory {}", dir.display()))?;
        }

        let bus = EventBus::default();
        let queue = Arc::new(WorkQueue::spawn());
        let monitor = Arc::new(Monitor::new(
            config.clone(),
            deps.orchestrator,
            Arc::clone(&queue),
            bus.clone(),
            deps.notifier,
        ));

        let events = bus.subscribe_topics(topics::DROP_TOPICS);
        let bus_pump = spawn_stoppable("bus pump", |stop| {
            spawn_bus_pump(Arc::clone(&monitor), deps.inbox, events, stop)
        });

        let health = FeedHealth::default();
        let feed = match subscribe_with_fallback(deps.feed.as_ref()).await {
            Some((_, notices)) => Some(spawn_stoppable("feed pump", |stop| {
                spawn_feed_pump(Arc::clone(&monitor), notices, health.clone(), stop)
            })),
            None => {
                health.mark_degraded();
                None
            }
        };

        let poll = spawn_stoppable("poll loop", |stop| {
            spawn_poll_loop(deps.source, Arc::clone(&monitor), health.clone(), stop)
        });

        let watcher_config = WatcherConfig {
            paths: vec![config.layout.responses_dir(), config.layout.inbox_dir()],
            ..WatcherConfig::default()
        };
        let watcher = match start_drop_watcher(watcher_config, bus.clone()) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::error!(
                    error = %error,
                    "file drop watcher unavailable; markers are still checked before cancelling"
                );
                None
            }
        };

        tracing::info!(
            event = MonitorEvent::ServiceStarted.as_str(),
            data_dir = %config.layout.root().display(),
            scanner = config.enable_scanner,
            degraded = health.is_degraded(),
            network_cancellation = config.enable_network_cancellation,
            "spoolguard started"
        );
        bus.emit(
            sources::SERVICE,
            topics::SYSTEM_READY,
            json!({ "degraded": health.is_degraded() }),
        );

        Ok(Self {
            monitor,
            bus,
            queue,
            health,
            watcher,
            poll,
            feed,
            bus_pump,
        })
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The push feed is unavailable and the poll loop carries detection.
    pub fn is_degraded(&self) -> bool {
        self.health.is_degraded()
    }

    /// Stop sources, drain the work queue and return its final counters.
    pub async fn shutdown(self) -> QueueStats {
        tracing::info!(
            event = MonitorEvent::ServiceStopping.as_str(),
            pending = self.queue.stats().pending(),
            "spoolguard stopping"
        );
        self.bus
            .emit(sources::SERVICE, topics::SYSTEM_SHUTDOWN, json!({}));

        if let Some(watcher) = &self.watcher {
            watcher.stop().await;
        }
        self.poll.stop().await;
        if let Some(feed) = self.feed {
            feed.stop().await;
        }
        self.bus_pump.stop().await;
        self.queue.stop().await;

        let stats = self.queue.stats();
        tracing::info!(
            enqueued = stats.enqueued,
            completed = stats.completed,
            failed = stats.failed,
            "work queue drained"
        );
        stats
    }
}

/// Run against the simulated spooler until Ctrl+C.
///
/// # Errors
///
/// Startup failed or the signal handler could not be installed.
pub async fn run_until_ctrl_c(config: MonitorConfig) -> anyhow::Result<()> {
    let spooler = Arc::new(SimulatedSpooler::new());
    let deps = ServiceDeps::simulated(&spooler, &config);
    let service = Service::start(config, deps).await?;

    let signal = tokio::signal::ctrl_c().await;
    service.shutdown().await;
    signal.map_err(anyhow::Error::from)
}
