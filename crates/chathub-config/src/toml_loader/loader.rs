//! Reading and parsing config files.

use std::io::ErrorKind;
use std::path::Path;

use chathub_common::ConfigError;
use tracing::{info, warn};

use super::paths::{default_config_path, write_default_config};
use crate::schema::ChatHubConfig;
use crate::validation;

/// Parse TOML text. Missing fields take serde defaults.
pub fn parse_config(content: &str) -> Result<ChatHubConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load config from a specific TOML file.
///
/// Validation problems are logged, not returned; [`crate::load_config`]
/// is the strict entry point.
pub fn load_from_path(path: &Path) -> Result<ChatHubConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let config = parse_config(&content).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;
    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "Config has invalid values");
    }

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Load `path`, seeding it from the template first when absent.
pub fn load_or_create(path: &Path) -> Result<ChatHubConfig, ConfigError> {
    if write_default_config(path)? {
        info!(path = %path.display(), "Wrote default config");
    }
    load_from_path(path)
}

/// Load config from [`default_config_path`], creating it on first run.
pub fn load_default() -> Result<ChatHubConfig, ConfigError> {
    load_or_create(&default_config_path()?)
}
