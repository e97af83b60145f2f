#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

//! spoolguard - Multi-copy print job monitor
//!
//! Watches a print spooler through three channels (push feed, periodic poll,
//! file drops), infers how many copies each job asks for, and cancels
//! multi-copy jobs unless the user approved them with an override marker.
//!
//! # Architecture
//!
//! ```text
//! spoolguard/src/
//! ├── lib.rs            # Re-exports (this file)
//! ├── main.rs           # Binary entry: tracing init + CLI dispatch
//! ├── cli.rs            # clap definitions
//! ├── config/           # Settings files → MonitorConfig
//! ├── monitor/          # Detection pipeline + bus pump
//! ├── sources/          # Push feed pump, poll loop, capability traits
//! ├── simulated.rs      # In-process spooler implementing every capability
//! ├── service.rs        # Start/stop of the whole monitor
//! ├── notifier.rs       # Localized user notice
//! ├── dumps.rs          # Diagnostic dumps for network jobs
//! ├── commands.rs       # approve / simulate / infer
//! └── observability.rs  # Canonical log event names
//! ```
//!
//! Event flow:
//!
//! ```text
//! feed ─┐
//! poll ─┼─> Monitor ──> WorkQueue ──> CancellationOrchestrator
//! bus  ─┘      │
//!              └──> EventBus (job/detected, job/cancelled, job/approved)
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod commands;
mod config;
mod dumps;
mod monitor;
mod notifier;
mod observability;
mod service;
mod simulated;
mod sources;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use commands::{
    InferReport, SimulatedJobSpec, approve_job, infer_attributes, infer_file, write_simulated_job,
};
pub use config::{
    DATA_DIR_ENV, DEFAULT_DEGRADED_WARNING_SECS, DEFAULT_JOB_AGE_THRESHOLD_SECS,
    DEFAULT_SCAN_INTERVAL_SECS, DEFAULT_SIGNATURE_WINDOW_SECS, DataLayout, Language,
    MonitorConfig, PrintMonitorSettings, RuntimeSettings, SYSTEM_SETTINGS_FILE,
    load_runtime_settings, load_runtime_settings_from_paths, resolve_data_dir,
};
pub use dumps::DumpWriter;
pub use monitor::{Decision, Monitor, build_observation};
pub use notifier::{LogNotifier, Notifier, render_notice};
pub use observability::MonitorEvent;
pub use service::{Service, ServiceDeps, run_until_ctrl_c};
pub use simulated::{SimulatedJob, SimulatedSpooler};
pub use sources::{
    FeedHealth, FeedScope, InboxSink, JobFeed, JobNotice, JobSource, PollReport, PolledJob,
    poll_once, subscribe_with_fallback,
};
