//! Public client: one [`ChatHubClient::ask_stream`] call per turn.

mod stream;


use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::captcha::UnavailableResolver;
use crate::{
    BypassServerResolver, CaptchaResolver, ChatHubError, ClientConfig, ConversationNegotiator,
    ConversationStyle, CookieJar, Event, FrameTransport, HttpNegotiator, RequestProfile,
    WebSocketTransport,
};

/// Receiving end of a turn's events. Closes exactly once, after a
/// terminal frame, an unrecoverable error, or cancellation.
pub type EventStream = mpsc::Receiver<Event>;

/// Streaming client. Cheap to clone; clones share collaborators and cookies.
#[derive(Clone)]
pub struct ChatHubClient {
    config: Arc<ClientConfig>,
    profile: Arc<RequestProfile>,
    cookies: CookieJar,
    negotiator: Arc<dyn ConversationNegotiator>,
    transport: Arc<dyn FrameTransport>,
    bypass: Option<Arc<dyn CaptchaResolver>>,
    builtin_resolver: Arc<dyn CaptchaResolver>,
}

impl ChatHubClient {
    /// Build a client with the HTTP negotiator, WebSocket transport and,
    /// when configured, the bypass-server resolver.
    pub fn new(config: ClientConfig) -> Result<Self, ChatHubError> {
        let cookies = CookieJar::from_header(&config.cookies);
        let negotiator = HttpNegotiator::new(&config, cookies.clone())?;
        let transport = WebSocketTransport::new(&config, cookies.clone());
        let bypass: Option<Arc<dyn CaptchaResolver>> = match config.bypass_server.as_deref() {
            Some(url) if !url.is_empty() => Some(Arc::new(BypassServerResolver::new(
                url,
                &config,
                cookies.clone(),
            )?)),
            _ => None,
        };
        let profile = RequestProfile::new(&config, config.style);

        info!(
            style = ?config.style,
            wss_url = %config.wss_url,
            bypass = bypass.is_some(),
            cookies = cookies.len(),
            "ChatHub client ready"
        );

        Ok(Self {
            config: Arc::new(config),
            profile: Arc::new(profile),
            cookies,
            negotiator: Arc::new(negotiator),
            transport: Arc::new(transport),
            bypass,
            builtin_resolver: Arc::new(UnavailableResolver),
        })
    }

    pub fn with_negotiator(mut self, negotiator: impl ConversationNegotiator + 'static) -> Self {
        self.negotiator = Arc::new(negotiator);
        self
    }

    pub fn with_transport(mut self, transport: impl FrameTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Install the built-in challenge solver, used when no bypass server
    /// is configured.
    pub fn with_captcha_resolver(mut self, resolver: impl CaptchaResolver + 'static) -> Self {
        self.builtin_resolver = Arc::new(resolver);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cookies shared by negotiation, the socket and the bypass resolver.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    fn resolver(&self) -> &Arc<dyn CaptchaResolver> {
        self.bypass.as_ref().unwrap_or(&self.builtin_resolver)
    }

    fn profile_for(&self, style: Option<ConversationStyle>) -> Cow<'_, RequestProfile> {
        match style {
            Some(style) if style != self.config.style => {
                Cow::Owned(RequestProfile::new(&self.config, style))
            }
            _ => Cow::Borrowed(&self.profile),
        }
    }
}
