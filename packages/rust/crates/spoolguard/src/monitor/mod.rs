//! Detection pipeline.
//!
//! One [`Monitor`] per service run owns the suppressor, the override store and
//! the handle to the work queue. Every event source funnels into
//! [`Monitor::on_job_operation`]; side effects (cancellation, marker cleanup,
//! dumps) go through the queue.

mod bus;
mod observe;
mod pipeline;

use std::sync::Arc;

use spoolguard_cancel::CancellationOrchestrator;
use spoolguard_detect::DuplicateSuppressor;
use spoolguard_events::EventBus;
use spoolguard_queue::WorkQueue;
use spoolguard_watch::OverrideStore;

use crate::config::MonitorConfig;
use crate::dumps::DumpWriter;
use crate::notifier::Notifier;

pub use bus::spawn_bus_pump;
pub use observe::build_observation;

/// What the pipeline did with one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Single-copy job; nothing to do.
    Normal { job_id: String },
    /// Job already claimed or approved earlier.
    AlreadyObserved { job_id: String },
    /// Override marker present; job let through.
    Approved { job_id: String },
    /// Network job while network cancellation is disabled.
    NetworkSkipped { job_id: String, copies: u32 },
    /// Cancellation handed to the work queue.
    CancellationQueued { job_id: String, copies: u32 },
    /// The work queue is stopped; nothing was queued.
    QueueClosed { job_id: String },
    /// Operation kind the pipeline does not react to.
    Ignored,
}

impl Decision {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Normal { job_id }
            | Self::AlreadyObserved { job_id }
            | Self::Approved { job_id }
            | Self::NetworkSkipped { job_id, .. }
            | Self::CancellationQueued { job_id, .. }
            | Self::QueueClosed { job_id } => Some(job_id),
            Self::Ignored => None,
        }
    }
}

pub struct Monitor {
    config: MonitorConfig,
    suppressor: Arc<DuplicateSuppressor>,
    markers: OverrideStore,
    orchestrator: Arc<CancellationOrchestrator>,
    queue: Arc<WorkQueue>,
    bus: EventBus,
    notifier: Arc<dyn Notifier>,
    dumps: DumpWriter,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .field("suppressor", &self.suppressor)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        orchestrator: CancellationOrchestrator,
        queue: Arc<WorkQueue>,
        bus: EventBus,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let suppressor = Arc::new(DuplicateSuppressor::new(config.signature_window));
        let markers = OverrideStore::new(config.layout.responses_dir());
        let dumps = DumpWriter::new(config.layout.dumps_dir());
        Self {
            config,
            suppressor,
            markers,
            orchestrator: Arc::new(orchestrator),
            queue,
            bus,
            notifier,
            dumps,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn suppressor(&self) -> &DuplicateSuppressor {
        &self.suppressor
    }

    pub fn markers(&self) -> &OverrideStore {
        &self.markers
    }

    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
