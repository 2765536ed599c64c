//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use allvis_harvest_cli::RunController;
use config_loader::ConfigLoader;
use contracts::HarvestBlueprint;
use observability::MetricsHandle;

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs, metrics: Option<&MetricsHandle>) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint).context("Invalid configuration after CLI overrides")?;

    info!(
        base_url = %blueprint.api.base_url,
        version = %blueprint.api.version,
        endpoints = blueprint.api.endpoints.len(),
        outputs = ?blueprint.output.enabled_kinds(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let mut controller = RunController::new(blueprint);
    let shutdown_signal = setup_shutdown_signal();

    let result = tokio::select! {
        result = controller.run() => result.map_err(anyhow::Error::from),
        _ = shutdown_signal => {
            warn!("Received shutdown signal, abandoning run");
            Err(anyhow::anyhow!("Interrupted before the run completed"))
        }
    };

    if let (Some(handle), Some(path)) = (metrics, args.metrics_file.as_ref()) {
        if let Err(e) = handle.write_textfile(path) {
            warn!(error = %e, "Failed to write metrics textfile");
        }
    }

    let stats = result.context("Harvest run failed")?;
    stats.print_summary();

    info!("Allvis harvest finished");
    Ok(())
}

/// Apply CLI and environment overrides on top of the file
fn apply_overrides(blueprint: &mut HarvestBlueprint, args: &RunArgs) {
    if let Some(ref id) = args.api_id {
        blueprint.api.api_id = id.clone();
    }
    if let Some(ref key) = args.api_key {
        blueprint.api.api_key = key.clone();
    }
    if let Some(ref password) = args.store_password {
        blueprint.output.document_store.password = password.clone();
    }
    if let Some(ref base_url) = args.base_url {
        info!(base_url = %base_url, "Overriding API base URL from CLI");
        blueprint.api.base_url = base_url.clone();
    }
    if let Some(ref path) = args.output_file {
        info!(path = %path.display(), "Enabling file output from CLI");
        blueprint.output.file.enabled = true;
        blueprint.output.file.path = path.display().to_string();
    }
    if let Some(concurrency) = args.concurrency {
        blueprint.run.concurrency = concurrency;
    }
    if let Some(policy) = args.failure_policy {
        blueprint.run.failure_policy = policy.into();
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &HarvestBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("API:");
    println!("  Root: {}/{}", blueprint.api.base_url, blueprint.api.version);
    println!("  Credentials: {}", credential_state(blueprint));
    println!("\nEndpoints ({}):", blueprint.api.endpoints.len());
    for endpoint in &blueprint.api.endpoint_set() {
        println!("  - {} -> org/{{id}}/{}", endpoint.name, endpoint.path);
    }

    println!("\nRun:");
    println!("  Timezone: {}", blueprint.run.timezone);
    println!("  Failure policy: {:?}", blueprint.run.failure_policy);
    println!("  Concurrency: {}", blueprint.run.concurrency);

    let outputs = blueprint.output.enabled_kinds();
    if outputs.is_empty() {
        println!("\nOutputs: none (a run would fail)");
    } else {
        println!("\nOutputs ({}):", outputs.len());
        for kind in outputs {
            println!("  - {}", kind.as_str());
        }
    }

    println!();
}

fn credential_state(blueprint: &HarvestBlueprint) -> &'static str {
    if ConfigLoader::validate_credentials(blueprint).is_ok() {
        "set"
    } else {
        "missing"
    }
}
