//! Where the config file lives, and seeding it on first run.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chathub_common::ConfigError;

use super::template::default_config_toml;

/// Names a config file that replaces the platform default.
pub const CONFIG_PATH_ENV: &str = "CHATHUB_CONFIG";

/// `$CHATHUB_CONFIG`, else `<config dir>/chathub/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV), dirs::config_dir())
}

pub(super) fn resolve_config_path(
    env_override: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join("chathub").join("config.toml"))
        .ok_or(ConfigError::NoConfigDir(CONFIG_PATH_ENV))
}

/// Write the commented template to `path` unless a file is already there.
///
/// Returns whether a new file was written. Never overwrites.
pub fn write_default_config(path: &Path) -> Result<bool, ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(io_err(e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(io_err)?;
    Ok(true)
}
