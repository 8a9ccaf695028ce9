//! Driftguard CLI - replay labelled prediction logs through a drift monitor
//!
//! This CLI lets operators:
//! - Replay a JSON-lines log of (prediction, actual, proba) observations
//! - See where each detector raised a warning or flagged drift
//! - Inspect and validate a monitor configuration file

use clap::{Parser, Subcommand};
use driftguard_core::MonitorConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{config, replay};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Driftguard CLI application
#[derive(Parser)]
#[command(name = "driftguard")]
#[command(about = "Driftguard - online concept-drift detection", long_about = None)]
#[command(version)]
struct Cli {
    /// Monitor configuration file (TOML)
    #[arg(short, long, env = "DRIFTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay an observation log through a fresh monitor
    Replay(replay::ReplayArgs),

    /// Show the effective monitor configuration
    Config,
}

/// Run using the current process arguments.
pub fn run() -> anyhow::Result<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so JSON output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let monitor_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay(args) => replay::execute(args, monitor_config, cli.output),
        Commands::Config => config::execute(&monitor_config, cli.config.as_deref(), cli.output),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MonitorConfig> {
    use anyhow::Context;

    match path {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(MonitorConfig::default()),
    }
}
