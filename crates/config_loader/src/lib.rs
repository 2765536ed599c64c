//! # Config Loader
//!
//! Turns `allvis.toml` (or an equivalent `.json`) into a validated
//! [`HarvestBlueprint`].
//!
//! Structure is checked on every load. Credentials are not: `validate` and
//! `info` must work on a file whose secrets arrive later from the
//! environment, so the run path calls [`ConfigLoader::validate_credentials`]
//! itself.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("allvis.toml")).unwrap();
//! ConfigLoader::validate_credentials(&blueprint).unwrap();
//! ```

mod parser;
mod validator;

pub use parser::ConfigFormat;

use contracts::{ContractError, HarvestBlueprint};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a config file
    pub fn load_from_path(path: &Path) -> Result<HarvestBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::load_from_str(&content, format)
    }

    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<HarvestBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-run structural validation, e.g. after CLI overrides
    pub fn validate(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Check that basic-auth credentials are present
    pub fn validate_credentials(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
        validator::validate_credentials(blueprint)
    }
}
