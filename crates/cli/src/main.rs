//! # Allvis Harvest CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - One collect-and-deliver run per invocation
//! - Exit codes separating misconfiguration from runtime failures

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use observability::{MetricsHandle, ObservabilityConfig};
use tracing::info;

use allvis_harvest_cli::exit_code_for;
use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    let metrics = match init_logging(&cli) {
        Ok(metrics) => metrics,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(allvis_harvest_cli::error::EXIT_RUNTIME_FAILURE);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Allvis harvest starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args, metrics.as_ref()).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_failure(&e)),
    }
}

/// Log a failed command and pick its exit code
///
/// Logging already goes to stderr, so the error is not printed again.
fn report_failure(error: &anyhow::Error) -> u8 {
    tracing::error!(error = %format!("{error:#}"), "Command failed");
    exit_code_for(error)
}

/// Initialize logging based on CLI options
///
/// The Prometheus recorder is only installed when a run writes a metrics
/// textfile.
fn init_logging(cli: &Cli) -> Result<Option<MetricsHandle>> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let metrics_enabled = matches!(
        &cli.command,
        Commands::Run(args) if args.metrics_file.is_some()
    );

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_enabled,
        default_log_level: default_log_level.to_string(),
    })
}
