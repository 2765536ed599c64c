//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Allvis Harvest - collect monitoring data from the Allvis API
#[derive(Parser, Debug)]
#[command(
    name = "allvis-harvest",
    author,
    version,
    about = "Allvis API harvester",
    long_about = "Collects every organization visible to the API credential, fetches its \n\
                  endpoints into one timestamped document, and writes that document to \n\
                  the console, a JSON file and/or a MongoDB-compatible document store."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ALLVIS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ALLVIS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect and deliver one snapshot
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "allvis.toml", env = "ALLVIS_CONFIG")]
    pub config: PathBuf,

    /// API basic-auth id
    #[arg(long, env = "ALLVIS_API_ID")]
    pub api_id: Option<String>,

    /// API basic-auth key
    #[arg(long, env = "ALLVIS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Document store password
    #[arg(long, env = "ALLVIS_STORE_PASSWORD", hide_env_values = true)]
    pub store_password: Option<String>,

    /// Override API base URL from configuration
    #[arg(long, env = "ALLVIS_BASE_URL")]
    pub base_url: Option<String>,

    /// Write the document to this file (enables the file output)
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Organizations collected concurrently
    #[arg(long, env = "ALLVIS_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Failure policy override
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailurePolicyArg>,

    /// Write Prometheus metrics to this textfile when the run ends
    #[arg(long, env = "ALLVIS_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Validate configuration and exit without contacting the API
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "allvis.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "allvis.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the endpoint map
    #[arg(long)]
    pub endpoints: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Failure policy as a CLI value
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FailurePolicyArg {
    /// Abort the run on the first failure
    AllOrNothing,
    /// Skip failed fetches/inserts and attempt every sink
    BestEffort,
}

impl From<FailurePolicyArg> for contracts::FailurePolicy {
    fn from(policy: FailurePolicyArg) -> Self {
        match policy {
            FailurePolicyArg::AllOrNothing => Self::AllOrNothing,
            FailurePolicyArg::BestEffort => Self::BestEffort,
        }
    }
}
