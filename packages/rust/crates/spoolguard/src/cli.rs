use std::path::PathBuf;

use clap::{Parser, Subcommand};

use spoolguard::{PrintMonitorSettings, RuntimeSettings};

#[derive(Parser)]
#[command(name = "spoolguard")]
#[command(about = "Detect and cancel multi-copy print jobs.")]
pub(crate) struct Cli {
    /// Data directory (default: $SPOOLGUARD_HOME, then ./.spoolguard).
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,

    /// User settings file layered over `<data-dir>/config.json`.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the monitor against the simulated spooler until Ctrl+C.
    Run {
        /// Debug logging (RUST_LOG still wins).
        #[arg(long)]
        verbose: bool,

        /// Seconds between queue polls.
        #[arg(long)]
        scan_interval: Option<u64>,

        /// Disable the poll loop unless the push feed fails.
        #[arg(long)]
        no_scanner: bool,

        /// Also cancel jobs hosted on remote print servers.
        #[arg(long)]
        network_cancellation: bool,

        /// Notification language (it, en).
        #[arg(long)]
        language: Option<String>,
    },
    /// Approve a job so it is not cancelled.
    Approve {
        /// Job id as shown in the notice.
        job_id: String,
    },
    /// Drop a simulated job into the inbox of a running monitor.
    Simulate {
        /// Queue (printer) name.
        #[arg(long, default_value = "Simulated")]
        queue: String,

        /// Numeric job id.
        #[arg(long)]
        job_id: u32,

        #[arg(long)]
        copies: Option<u32>,

        #[arg(long)]
        total_pages: Option<u32>,

        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        /// Host queue, e.g. \\server\printer for a network job.
        #[arg(long)]
        host_queue: Option<String>,

        /// Print ticket XML.
        #[arg(long)]
        ticket: Option<String>,
    },
    /// Print the inference result for a JSON attribute file.
    Infer {
        /// JSON object of job attributes.
        file: PathBuf,
    },
}

impl Command {
    /// Settings given on the command line; they win over both files.
    pub(crate) fn settings_overlay(&self) -> RuntimeSettings {
        match self {
            Self::Run {
                scan_interval,
                no_scanner,
                network_cancellation,
                language,
                ..
            } => RuntimeSettings {
                language: language.clone(),
                print_monitor: PrintMonitorSettings {
                    enable_scanner_in_service: no_scanner.then_some(false),
                    enable_network_cancellation: network_cancellation.then_some(true),
                    scan_interval_seconds: *scan_interval,
                    ..PrintMonitorSettings::default()
                },
            },
            _ => RuntimeSettings::default(),
        }
    }

    pub(crate) fn is_verbose(&self) -> bool {
        matches!(self, Self::Run { verbose: true, .. })
    }
}
