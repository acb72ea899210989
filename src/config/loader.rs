//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    load_config_with_overrides(path, |_| {})
}

/// Load a TOML file, apply command-line overrides, then validate.
///
/// Overrides run before validation so that secrets left empty in the file can
/// be supplied from the environment.
pub fn load_config_with_overrides<F>(path: &Path, overrides: F) -> Result<ServiceConfig, ConfigError>
where
    F: FnOnce(&mut ServiceConfig),
{
    let content = fs::read_to_string(path)?;
    let mut config: ServiceConfig = toml::from_str(&content)?;
    overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
