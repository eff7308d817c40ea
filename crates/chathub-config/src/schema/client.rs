//! Remote chat service connection settings.

use serde::{Deserialize, Serialize};

/// Conversation tone selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConversationStyle {
    #[default]
    Creative,
    Balanced,
    Precise,
    /// Creative tone with the image-designer persona.
    Designer,
}

/// `[client]` section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub conversation_style: ConversationStyle,
    pub locale: String,
    /// Host serving the ChatHub socket.
    pub wss_domain: String,
    pub create_conversation_url: String,
    /// CAPTCHA bypass service URL. Empty selects the built-in resolver.
    pub bypass_server: String,
    /// Proxy URL for HTTP requests. Empty means direct.
    pub proxy: String,
    pub no_search: bool,
    pub gpt4_turbo: bool,
    pub use_classic: bool,
    /// Replaces the derived option set entirely when non-empty.
    pub option_sets_override: Vec<String>,
    /// Raw `Cookie` header value.
    pub cookies: String,
}

impl std::fmt::Debug for ClientSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSection")
            .field("conversation_style", &self.conversation_style)
            .field("locale", &self.locale)
            .field("wss_domain", &self.wss_domain)
            .field("create_conversation_url", &self.create_conversation_url)
            .field("bypass_server", &self.bypass_server)
            .field("proxy", &self.proxy)
            .field("no_search", &self.no_search)
            .field("gpt4_turbo", &self.gpt4_turbo)
            .field("use_classic", &self.use_classic)
            .field("option_sets_override", &self.option_sets_override)
            .field("cookies", &"[REDACTED]")
            .finish()
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            conversation_style: ConversationStyle::Creative,
            locale: "en-US".into(),
            wss_domain: "sydney.bing.com".into(),
            create_conversation_url:
                "https://edgeservices.bing.com/edgesvc/turing/conversation/create".into(),
            bypass_server: String::new(),
            proxy: String::new(),
            no_search: false,
            gpt4_turbo: false,
            use_classic: false,
            option_sets_override: Vec::new(),
            cookies: String::new(),
        }
    }
}
