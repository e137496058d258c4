//! TOML config loading helpers.
//!
//! Each component owns its config struct; these helpers give them a common
//! load/save path so deployments can keep one file per component (or one
//! aggregate file assembled by the operator).

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Errors from config loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Load a config value from a TOML file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let value = toml::from_str(&contents)?;
    Ok(value)
}

/// Parse a config value from a TOML string.
pub fn from_toml_str<T: DeserializeOwned>(contents: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Render a config value as a TOML string.
pub fn to_toml_string<T: Serialize>(value: &T) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(value)?)
}

/// Save a config value to a TOML file.
pub fn save_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let contents = to_toml_string(value)?;
    std::fs::write(path, contents)?;
    Ok(())
}
