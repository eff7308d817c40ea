//! Full configuration validation.
//!
//! Each check pushes onto a shared error list; the orchestrator joins them
//! into a single `ConfigError`.

mod helpers;


use crate::schema::ChatHubConfig;
use chathub_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ChatHubConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_client(&mut errors, config);
    validate_timeouts(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_client(errors: &mut Vec<String>, config: &ChatHubConfig) {
    let client = &config.client;
    if client.locale.trim().is_empty() {
        errors.push("client.locale must not be empty".into());
    }
    if client.wss_domain.trim().is_empty() {
        errors.push("client.wss_domain must not be empty".into());
    }
    if !client.create_conversation_url.starts_with("http") {
        errors.push(format!(
            "client.create_conversation_url = {:?} is not an http(s) URL",
            client.create_conversation_url
        ));
    }
    if !client.bypass_server.is_empty() && !client.bypass_server.starts_with("http") {
        errors.push(format!(
            "client.bypass_server = {:?} is not an http(s) URL",
            client.bypass_server
        ));
    }
}

fn validate_timeouts(errors: &mut Vec<String>, config: &ChatHubConfig) {
    let t = &config.timeouts;
    validate_range(errors, "timeouts.dial_secs", t.dial_secs, 1, 60);
    validate_range(errors, "timeouts.read_secs", t.read_secs, 5, 600);
    validate_range(errors, "timeouts.write_secs", t.write_secs, 1, 60);
    validate_range(
        errors,
        "timeouts.keep_alive_period_secs",
        t.keep_alive_period_secs,
        1,
        60,
    );
    validate_range(errors, "timeouts.http_secs", t.http_secs, 1, 300);
}
