//! spoolguard CLI: run the monitor, approve a job, drop a simulated job, or
//! inspect a fixture.
//!
//! Logging: `RUST_LOG=spoolguard=debug` (or `info`, `warn`) on stderr.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spoolguard::{
    DataLayout, MonitorConfig, MonitorEvent, SimulatedJobSpec, approve_job, infer_file,
    load_runtime_settings, resolve_data_dir, run_until_ctrl_c, write_simulated_job,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose on run => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.command.is_verbose() {
            "spoolguard=debug,spoolguard_=debug"
        } else {
            "spoolguard=info,spoolguard_=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(
            event = MonitorEvent::ServiceCrashed.as_str(),
            panic = %info,
            "spoolguard panicked"
        );
        default_hook(info);
    }));

    let result = dispatch(cli).await;
    if let Err(error) = &result {
        tracing::error!(
            event = MonitorEvent::ServiceCrashed.as_str(),
            error = %format!("{error:#}"),
            "spoolguard exited with an error"
        );
    }
    result
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let layout = DataLayout::new(&data_dir);

    match cli.command {
        command @ Command::Run { .. } => {
            let settings = load_runtime_settings(&data_dir, cli.config.as_deref())
                .merge(command.settings_overlay());
            run_until_ctrl_c(MonitorConfig::from_settings(&data_dir, &settings)).await
        }
        Command::Approve { job_id } => {
            let path = approve_job(&layout, &job_id)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Simulate {
            queue,
            job_id,
            copies,
            total_pages,
            document,
            owner,
            host_queue,
            ticket,
        } => {
            let spec = SimulatedJobSpec {
                queue,
                job_id,
                copies,
                total_pages,
                document,
                owner,
                host_queue,
                ticket,
            };
            let path = write_simulated_job(&layout, &spec)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Infer { file } => {
            let report = infer_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
