//! # Observability
//!
//! Tracing and Prometheus metrics for harvest runs.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact), always on stderr so the
//!   console sink owns stdout
//! - Prometheus recorder whose rendered text can be written to a
//!   node-exporter textfile at the end of a run
//!
//! ## Usage Example
//!
//! ```ignore
//! let metrics = observability::init_with_config(ObservabilityConfig {
//!     metrics_enabled: true,
//!     ..Default::default()
//! })?;
//!
//! // ... run ...
//!
//! if let Some(handle) = metrics {
//!     handle.write_textfile("/var/lib/node_exporter/allvis.prom")?;
//! }
//! ```

pub mod metrics;

use std::path::Path;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_api_request, record_documents_written, record_fetch_skipped,
    record_organization_collected, record_run, record_sink_delivery,
};

/// Initialize with defaults (JSON logs at info, no metrics recorder)
pub fn init() -> Result<Option<MetricsHandle>> {
    init_with_config(ObservabilityConfig::default())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Install a Prometheus recorder
    pub metrics_enabled: bool,
    /// Default log level when `RUST_LOG` is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_enabled: false,
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human readable
    Pretty,
    /// Compact single line
    Compact,
}

/// Handle to the installed Prometheus recorder
#[derive(Clone)]
pub struct MetricsHandle {
    inner: PrometheusHandle,
}

impl MetricsHandle {
    /// Current metrics in Prometheus text exposition format
    pub fn render(&self) -> String {
        self.inner.render()
    }

    /// Write the rendered metrics to `path`, replacing it atomically
    ///
    /// The text is written next to the target first and then renamed, so a
    /// scraping node-exporter never reads a partial file.
    pub fn write_textfile(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("prom.tmp");

        std::fs::write(&tmp, self.render())
            .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move metrics into {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Metrics textfile written");
        Ok(())
    }
}

impl From<PrometheusHandle> for MetricsHandle {
    fn from(inner: PrometheusHandle) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for MetricsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsHandle").finish_non_exhaustive()
    }
}

/// Initialize with a custom configuration
///
/// Returns the metrics handle when `metrics_enabled` is set.
pub fn init_with_config(config: ObservabilityConfig) -> Result<Option<MetricsHandle>> {
    // 1. Initialize Tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    // 2. Install the Prometheus recorder (if enabled)
    let handle = if config.metrics_enabled {
        Some(init_metrics_only()?)
    } else {
        None
    };

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(handle)
}

/// Install only the Prometheus recorder (tracing set up elsewhere)
pub fn init_metrics_only() -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    Ok(MetricsHandle::from(handle))
}
