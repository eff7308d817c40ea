//! Tests for TOML config loading, seeding, and path resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chathub_common::ConfigError;

use super::paths::resolve_config_path;
use super::*;
use crate::schema::ConversationStyle;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    assert!(matches!(
        load_from_path(&path),
        Err(ConfigError::FileNotFound(p)) if p == path
    ));
}

#[test]
fn load_from_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_from_path(dir.path()),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[client]
conversation_style = "Balanced"
bypass_server = "https://bypass.example.com"

[timeouts]
read_secs = 120
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.client.conversation_style, ConversationStyle::Balanced);
    assert_eq!(config.client.bypass_server, "https://bypass.example.com");
    assert_eq!(config.timeouts.read_secs, 120);
    assert_eq!(config.timeouts.dial_secs, 10);
    assert_eq!(config.client.locale, "en-US");
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    match load_from_path(&path) {
        Err(ConfigError::ParseError(msg)) => assert!(msg.contains("config.toml"), "{msg}"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_config_with_invalid_values_is_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[timeouts]\ndial_secs = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.timeouts.dial_secs, 0);
}

#[test]
fn load_or_create_seeds_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chathub").join("config.toml");

    let config = load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.client.conversation_style, ConversationStyle::Creative);
    assert_eq!(config.timeouts.keep_alive_period_secs, 6);
}

#[test]
fn load_or_create_keeps_user_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[client]\nconversation_style = \"Precise\"\n").unwrap();

    assert!(!write_default_config(&path).unwrap());
    let config = load_or_create(&path).unwrap();
    assert_eq!(config.client.conversation_style, ConversationStyle::Precise);
}

#[test]
fn default_config_toml_is_valid() {
    let config = parse_config(&super::template::default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn env_override_wins_over_platform_dir() {
    let path = resolve_config_path(
        Some(OsString::from("/srv/chathub.toml")),
        Some(PathBuf::from("/home/u/.config")),
    )
    .unwrap();
    assert_eq!(path, Path::new("/srv/chathub.toml"));
}

#[test]
fn empty_env_override_is_ignored() {
    let path = resolve_config_path(Some(OsString::new()), Some(PathBuf::from("/cfg"))).unwrap();
    assert_eq!(path, Path::new("/cfg/chathub/config.toml"));
}

#[test]
fn missing_platform_dir_is_reported() {
    assert!(matches!(
        resolve_config_path(None, None),
        Err(ConfigError::NoConfigDir(CONFIG_PATH_ENV))
    ));
}
