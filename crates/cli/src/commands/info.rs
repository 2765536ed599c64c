//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::HarvestBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

const MASK: &str = "***";

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    api: ApiInfo,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    endpoints: BTreeMap<String, String>,
    run: RunInfo,
    outputs: OutputInfo,
}

#[derive(Serialize)]
struct ApiInfo {
    base_url: String,
    version: String,
    api_id: String,
    api_key: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct RunInfo {
    timezone: String,
    failure_policy: String,
    concurrency: usize,
}

#[derive(Serialize)]
struct OutputInfo {
    console: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_store: Option<StoreInfo>,
}

#[derive(Serialize)]
struct StoreInfo {
    connection: String,
    user: String,
    password: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

/// Never echo a secret, only whether it is set
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        MASK.to_string()
    }
}

fn build_config_info(blueprint: &HarvestBlueprint, args: &InfoArgs) -> ConfigInfo {
    let api = &blueprint.api;
    let output = &blueprint.output;

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        api: ApiInfo {
            base_url: api.base_url.clone(),
            version: api.version.clone(),
            api_id: api.api_id.clone(),
            api_key: mask(&api.api_key),
            timeout_secs: api.timeout_secs,
        },
        endpoints: if args.endpoints {
            api.endpoints.clone()
        } else {
            BTreeMap::new()
        },
        run: RunInfo {
            timezone: blueprint.run.timezone.clone(),
            failure_policy: format!("{:?}", blueprint.run.failure_policy),
            concurrency: blueprint.run.concurrency,
        },
        outputs: OutputInfo {
            console: output.console.enabled,
            file: output.file.enabled.then(|| output.file.path.clone()),
            document_store: output.document_store.enabled.then(|| StoreInfo {
                connection: output.document_store.connection.clone(),
                user: output.document_store.user.clone(),
                password: mask(&output.document_store.password),
            }),
        },
    }
}

fn print_config_info(blueprint: &HarvestBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Allvis Harvest Configuration                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let api = &blueprint.api;
    println!("🌐 API");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Root: {}/{}", api.base_url, api.version);
    println!("   ├─ API id: {}", api.api_id);
    println!("   ├─ API key: {}", mask(&api.api_key));
    println!("   └─ Timeout: {}s", api.timeout_secs);

    let endpoints = api.endpoint_set();
    println!("\n🔗 Endpoints ({})", endpoints.len());
    if args.endpoints {
        for (i, endpoint) in endpoints.iter().enumerate() {
            let prefix = if i == endpoints.len() - 1 { "└─" } else { "├─" };
            println!("   {} {} -> org/{{id}}/{}", prefix, endpoint.name, endpoint.path);
        }
    } else {
        println!("   └─ {}", endpoints.names().collect::<Vec<_>>().join(", "));
    }

    let run = &blueprint.run;
    println!("\n⚙️  Run Settings");
    println!("   ├─ Timezone: {}", run.timezone);
    println!("   ├─ Failure policy: {:?}", run.failure_policy);
    println!("   └─ Concurrency: {}", run.concurrency);

    let output = &blueprint.output;
    let kinds = output.enabled_kinds();
    println!("\n📤 Outputs ({})", kinds.len());
    if kinds.is_empty() {
        println!("   └─ (none enabled)");
    }
    for (i, kind) in kinds.iter().enumerate() {
        let prefix = if i == kinds.len() - 1 { "└─" } else { "├─" };
        let detail = match kind {
            contracts::SinkKind::Console => "stdout".to_string(),
            contracts::SinkKind::File => output.file.path.clone(),
            contracts::SinkKind::DocumentStore => format!(
                "{}@{} (password {})",
                output.document_store.user,
                output.document_store.connection,
                if output.document_store.password.is_empty() {
                    "missing"
                } else {
                    MASK
                }
            ),
        };
        println!("   {} {} ({})", prefix, kind.as_str(), detail);
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigFormat;

    #[test]
    fn test_secrets_masked() {
        let blueprint = ConfigLoader::load_from_str(
            r#"
[api]
api_id = "public-id"
api_key = "very-secret"

[output.document_store]
enabled = true
user = "cosmos"
password = "also-secret"
connection = "acct.mongo.cosmos.azure.com:10255/?ssl=true"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        let args = InfoArgs {
            config: "unused.toml".into(),
            json: true,
            endpoints: true,
        };

        let json = serde_json::to_string(&build_config_info(&blueprint, &args)).unwrap();
        assert!(json.contains("public-id"));
        assert!(!json.contains("very-secret"));
        assert!(!json.contains("also-secret"));
        assert!(json.contains("\"orgInfo\""));
    }
}
