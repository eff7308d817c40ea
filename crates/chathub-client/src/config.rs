//! Runtime client configuration.

use std::fmt;
use std::time::Duration;

use chathub_config::{ChatHubConfig, ConversationStyle};

/// Per-operation timeouts. Fixed values, never adapted at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub dial: Duration,
    pub read: Duration,
    pub write: Duration,
    pub keep_alive_period: Duration,
    pub http: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dial: Duration::from_secs(10),
            read: Duration::from_secs(60),
            write: Duration::from_secs(10),
            keep_alive_period: Duration::from_secs(6),
            http: Duration::from_secs(30),
        }
    }
}

/// Client configuration, built once per [`crate::ChatHubClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub style: ConversationStyle,
    pub locale: String,
    pub wss_url: String,
    pub create_conversation_url: String,
    pub bypass_server: Option<String>,
    pub proxy: Option<String>,
    pub no_search: bool,
    pub gpt4_turbo: bool,
    pub use_classic: bool,
    pub option_sets_override: Vec<String>,
    /// Raw `Cookie` header value.
    pub cookies: String,
    pub timeouts: Timeouts,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("style", &self.style)
            .field("locale", &self.locale)
            .field("wss_url", &self.wss_url)
            .field("create_conversation_url", &self.create_conversation_url)
            .field("bypass_server", &self.bypass_server)
            .field("proxy", &self.proxy)
            .field("no_search", &self.no_search)
            .field("gpt4_turbo", &self.gpt4_turbo)
            .field("use_classic", &self.use_classic)
            .field("option_sets_override", &self.option_sets_override)
            .field("cookies", &"[REDACTED]")
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&ChatHubConfig::default())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn secs(value: u32) -> Duration {
    Duration::from_secs(u64::from(value))
}

impl From<&ChatHubConfig> for ClientConfig {
    fn from(config: &ChatHubConfig) -> Self {
        let client = &config.client;
        let t = &config.timeouts;
        Self {
            style: client.conversation_style,
            locale: non_empty(&client.locale).unwrap_or_else(|| "en-US".into()),
            wss_url: format!("wss://{}/sydney/ChatHub", client.wss_domain.trim()),
            create_conversation_url: client.create_conversation_url.clone(),
            bypass_server: non_empty(&client.bypass_server),
            proxy: non_empty(&client.proxy),
            no_search: client.no_search,
            gpt4_turbo: client.gpt4_turbo,
            use_classic: client.use_classic,
            option_sets_override: client.option_sets_override.clone(),
            cookies: client.cookies.clone(),
            timeouts: Timeouts {
                dial: secs(t.dial_secs),
                read: secs(t.read_secs),
                write: secs(t.write_secs),
                keep_alive_period: secs(t.keep_alive_period_secs),
                http: secs(t.http_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.wss_url, "wss://sydney.bing.com/sydney/ChatHub");
        assert_eq!(config.timeouts, Timeouts::default());
        assert!(config.bypass_server.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn custom_domain_and_bypass() {
        let mut file = ChatHubConfig::default();
        file.client.wss_domain = "chat.example.com".into();
        file.client.bypass_server = " https://bypass.example.com ".into();
        let config = ClientConfig::from(&file);
        assert_eq!(config.wss_url, "wss://chat.example.com/sydney/ChatHub");
        assert_eq!(
            config.bypass_server.as_deref(),
            Some("https://bypass.example.com")
        );
    }

    #[test]
    fn debug_redacts_cookies() {
        let config = ClientConfig {
            cookies: "_U=secret".into(),
            ..ClientConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
