//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, HarvestBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    api_root: String,
    endpoint_count: usize,
    outputs: Vec<&'static str>,
    failure_policy: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let (result, failure) = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    match failure {
        None => Ok(()),
        Some(e) => Err(e).context("Configuration validation failed"),
    }
}

fn validate_config(args: &ValidateArgs) -> (ValidationResult, Option<ContractError>) {
    let config_path = args.config.display().to_string();

    match ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let result = ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    api_root: format!("{}/{}", blueprint.api.base_url, blueprint.api.version),
                    endpoint_count: blueprint.api.endpoints.len(),
                    outputs: blueprint
                        .output
                        .enabled_kinds()
                        .iter()
                        .map(|k| k.as_str())
                        .collect(),
                    failure_policy: format!("{:?}", blueprint.run.failure_policy),
                }),
            };
            (result, None)
        }
        Err(e) => {
            let result = ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            };
            (result, Some(e))
        }
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &HarvestBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if !blueprint.output.any_enabled() {
        warnings.push("No outputs are enabled - a run would fail without contacting the API".to_string());
    }

    if ConfigLoader::validate_credentials(blueprint).is_err() {
        warnings.push(
            "api.api_id / api.api_key not set - supply them via ALLVIS_API_ID / ALLVIS_API_KEY"
                .to_string(),
        );
    }

    let store = &blueprint.output.document_store;
    if store.enabled && store.password.is_empty() {
        warnings.push(
            "output.document_store.password is empty - supply it via ALLVIS_STORE_PASSWORD"
                .to_string(),
        );
    }

    if blueprint.run.concurrency > 1 {
        warnings.push(format!(
            "run.concurrency = {} - organizations will be requested in parallel",
            blueprint.run.concurrency
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  API: {}", summary.api_root);
            println!("  Endpoints: {}", summary.endpoint_count);
            println!("  Outputs: {}", summary.outputs.join(", "));
            println!("  Failure policy: {}", summary.failure_policy);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigFormat;

    #[test]
    fn test_warnings_for_no_outputs_and_credentials() {
        let blueprint = ConfigLoader::load_from_str("[api]\n", ConfigFormat::Toml).unwrap();
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("No outputs")));
        assert!(warnings.iter().any(|w| w.contains("ALLVIS_API_ID")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "does-not-exist.toml".into(),
            json: true,
        };
        let (result, failure) = validate_config(&args);
        assert!(!result.valid);
        assert!(failure.is_some_and(|e| e.is_configuration()));
    }
}
