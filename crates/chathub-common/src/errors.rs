use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no platform config directory; set {0} to a config file path")]
    NoConfigDir(&'static str),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("timeouts.dial_secs = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: timeouts.dial_secs = 0"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error;

        let err = ConfigError::Io {
            path: PathBuf::from("/etc/chathub.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "cannot access config file /etc/chathub.toml: denied"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_config_dir_names_override() {
        let err = ConfigError::NoConfigDir("CHATHUB_CONFIG");
        assert!(err.to_string().contains("CHATHUB_CONFIG"));
    }
}
