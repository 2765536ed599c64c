//! Configuration validation
//!
//! Rules:
//! - api.base_url is an absolute http(s) URL, api.version is non-empty
//! - endpoint names are non-empty, unique by construction, never `org`,
//!   and usable as store collection names
//! - endpoint paths are relative (no leading '/')
//! - run.timezone is a known IANA zone, 1 <= run.concurrency <= 64
//! - enabled sinks carry their required parameters
//!
//! Credentials are checked separately because the CLI may inject them
//! from the environment after the file is parsed.

use chrono_tz::Tz;
use contracts::{ContractError, HarvestBlueprint, ORG_FIELD};

const MAX_CONCURRENCY: usize = 64;

/// Validate a HarvestBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    validate_api(blueprint)?;
    validate_endpoints(blueprint)?;
    validate_run(blueprint)?;
    validate_outputs(blueprint)?;
    Ok(())
}

/// Validate that basic-auth credentials are present
pub fn validate_credentials(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    if blueprint.api.api_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "api.api_id",
            "API id is required (config file or ALLVIS_API_ID)",
        ));
    }
    if blueprint.api.api_key.is_empty() {
        return Err(ContractError::config_validation(
            "api.api_key",
            "API key is required (config file or ALLVIS_API_KEY)",
        ));
    }
    Ok(())
}

fn validate_api(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let api = &blueprint.api;

    let url = url::Url::parse(&api.base_url).map_err(|e| {
        ContractError::config_validation(
            "api.base_url",
            format!("invalid URL '{}': {e}", api.base_url),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ContractError::config_validation(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if api.version.trim_matches('/').is_empty() {
        return Err(ContractError::config_validation(
            "api.version",
            "version segment cannot be empty",
        ));
    }

    if api.timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "api.timeout_secs",
            "timeout_secs must be > 0",
        ));
    }

    Ok(())
}

fn validate_endpoints(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let endpoints = &blueprint.api.endpoints;

    if endpoints.is_empty() {
        return Err(ContractError::config_validation(
            "api.endpoints",
            "at least one endpoint is required",
        ));
    }

    for (name, path) in endpoints {
        let field = format!("api.endpoints.{name}");

        if name.is_empty() {
            return Err(ContractError::config_validation(
                "api.endpoints",
                "endpoint name cannot be empty",
            ));
        }
        if name == ORG_FIELD {
            return Err(ContractError::config_validation(
                field,
                format!("'{ORG_FIELD}' is reserved for the organization entry"),
            ));
        }
        if name.contains('$') || name.contains('\0') || name.starts_with("system.") {
            return Err(ContractError::config_validation(
                field,
                "endpoint name is not a valid collection name",
            ));
        }
        if path.starts_with('/') {
            return Err(ContractError::config_validation(
                field,
                format!("path '{path}' must be relative (no leading '/')"),
            ));
        }
    }

    Ok(())
}

fn validate_run(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let run = &blueprint.run;

    if run.timezone.parse::<Tz>().is_err() {
        return Err(ContractError::config_validation(
            "run.timezone",
            format!("unknown timezone '{}'", run.timezone),
        ));
    }

    if run.concurrency == 0 || run.concurrency > MAX_CONCURRENCY {
        return Err(ContractError::config_validation(
            "run.concurrency",
            format!(
                "concurrency must be within 1..={MAX_CONCURRENCY}, got {}",
                run.concurrency
            ),
        ));
    }

    Ok(())
}

fn validate_outputs(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let output = &blueprint.output;

    if output.file.enabled && output.file.path.trim().is_empty() {
        return Err(ContractError::config_validation(
            "output.file.path",
            "file output is enabled but path is empty",
        ));
    }

    let store = &output.document_store;
    if store.enabled {
        if store.connection.trim().is_empty() {
            return Err(ContractError::config_validation(
                "output.document_store.connection",
                "document store is enabled but connection is empty",
            ));
        }
        if store.connection.starts_with("mongodb://") || store.connection.starts_with("mongodb+srv://") {
            return Err(ContractError::config_validation(
                "output.document_store.connection",
                "connection must not include the scheme; it is prefixed with mongodb://",
            ));
        }
        if store.user.trim().is_empty() {
            return Err(ContractError::config_validation(
                "output.document_store.user",
                "document store is enabled but user is empty",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ApiConfig, ConfigVersion, OutputConfig, RunConfig};
    use std::collections::BTreeMap;

    fn minimal_blueprint() -> HarvestBlueprint {
        let mut output = OutputConfig::default();
        output.file.enabled = true;

        HarvestBlueprint {
            version: ConfigVersion::V1,
            run: RunConfig::default(),
            api: ApiConfig {
                base_url: "https://api.allvis.no".into(),
                version: "v0".into(),
                api_id: "id".into(),
                api_key: "key".into(),
                endpoints: BTreeMap::from([("nets".to_string(), "groups".to_string())]),
                timeout_secs: 30,
            },
            output,
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
        assert!(validate_credentials(&bp).is_ok());
    }

    #[test]
    fn test_no_outputs_is_not_a_validation_error() {
        // The run controller reports this case itself
        let mut bp = minimal_blueprint();
        bp.output = OutputConfig::default();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut bp = minimal_blueprint();
        bp.api.base_url = "not a url".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("api.base_url"), "got: {err}");

        bp.api.base_url = "ftp://api.allvis.no".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("unsupported scheme"), "got: {err}");
    }

    #[test]
    fn test_reserved_endpoint_name() {
        let mut bp = minimal_blueprint();
        bp.api.endpoints.insert("org".into(), "".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("reserved"), "got: {err}");
    }

    #[test]
    fn test_empty_endpoint_path_allowed() {
        let mut bp = minimal_blueprint();
        bp.api.endpoints.insert("orgInfo".into(), "".into());
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_absolute_endpoint_path() {
        let mut bp = minimal_blueprint();
        bp.api.endpoints.insert("services".into(), "/services".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must be relative"), "got: {err}");
    }

    #[test]
    fn test_no_endpoints() {
        let mut bp = minimal_blueprint();
        bp.api.endpoints.clear();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at least one endpoint"), "got: {err}");
    }

    #[test]
    fn test_unknown_timezone() {
        let mut bp = minimal_blueprint();
        bp.run.timezone = "Mars/Olympus".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("unknown timezone"), "got: {err}");
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut bp = minimal_blueprint();
        bp.run.concurrency = 0;
        assert!(validate(&bp).is_err());
        bp.run.concurrency = 65;
        assert!(validate(&bp).is_err());
        bp.run.concurrency = 8;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_document_store_requires_connection() {
        let mut bp = minimal_blueprint();
        bp.output.document_store.enabled = true;
        bp.output.document_store.user = "user".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("connection is empty"), "got: {err}");

        bp.output.document_store.connection = "mongodb://host:10255".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("scheme"), "got: {err}");

        bp.output.document_store.connection = "host:10255/?ssl=true".into();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_missing_credentials() {
        let mut bp = minimal_blueprint();
        bp.api.api_key = String::new();
        let err = validate_credentials(&bp).unwrap_err().to_string();
        assert!(err.contains("api.api_key"), "got: {err}");
    }
}
