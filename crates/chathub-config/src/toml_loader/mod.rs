//! TOML config file loading and creation.

mod loader;
mod paths;
mod template;

#[cfg(test)]
mod tests;

pub use loader::{load_default, load_from_path, load_or_create, parse_config};
pub use paths::{default_config_path, write_default_config, CONFIG_PATH_ENV};
