//! ChatHub client configuration.
//!
//! TOML-based configuration with full validation. All config sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chathub_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    ChatHubConfig, ClientSection, ConversationStyle, LogLevel, LoggingConfig, TimeoutsConfig,
    CONFIG_SCHEMA_VERSION,
};

use chathub_common::ConfigError;

/// Load config from the platform default path.
///
/// Creates a default `config.toml` if none exists, then validates the result.
pub fn load_config() -> Result<ChatHubConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
///
/// The cookie string is blanked out.
pub fn config_to_json(config: &ChatHubConfig) -> String {
    let mut redacted = config.clone();
    if !redacted.client.cookies.is_empty() {
        redacted.client.cookies = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
