//! Warden Daemon
//!
//! Runs one long-lived background task and guarantees the process ends
//! through exactly one exit path: worker completion (status 0) or the hard
//! deadline (status 1). Ctrl+C asks the worker to stop at its next check.

mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use signals::Interrupts;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use warden_core::{Supervisor, SupervisorConfig, Termination};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden - supervise a background task under a hard deadline")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/warden/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hard deadline in milliseconds, counted from startup
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Duration of one simulated unit of work in milliseconds
    #[arg(long)]
    work_unit_ms: Option<u64>,

    /// Finish naturally after this many units of work
    #[arg(long)]
    iterations: Option<u64>,
}

impl Cli {
    /// Load the config file and apply command-line overrides on top
    fn resolve_config(&self) -> Result<SupervisorConfig> {
        let mut config = match &self.config {
            Some(path) => SupervisorConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SupervisorConfig::load(),
        };

        if let Some(deadline_ms) = self.deadline_ms {
            config.deadline_ms = deadline_ms;
        }
        if let Some(work_unit_ms) = self.work_unit_ms {
            config.work_unit_ms = work_unit_ms;
        }
        if self.iterations.is_some() {
            config.max_iterations = self.iterations;
        }

        Ok(config)
    }
}

/// Supervise the simulated workload until it completes or times out
async fn run(config: SupervisorConfig) -> Result<Termination> {
    let supervisor = Supervisor::new(config).context("Invalid configuration")?;

    // Handler must be in place before the worker starts
    let interrupts = Interrupts::register().context("Failed to register interrupt handler")?;
    let (interrupt_tx, interrupt_rx) = mpsc::channel(8);
    let forwarder = tokio::spawn(interrupts.forward(interrupt_tx));

    let work = supervisor.simulated_work();
    let termination = supervisor
        .run(work, interrupt_rx)
        .await
        .context("Failed to launch processor")?;

    forwarder.abort();
    Ok(termination)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let termination = runtime.block_on(run(config))?;

    if termination == Termination::Hard {
        // Worker thread and runtime are abandoned, not drained
        std::process::exit(termination.exit_code());
    }

    Ok(())
}
