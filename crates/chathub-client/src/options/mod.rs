//! Turn input and the per-client request profile.

mod profile;

pub use profile::{LatLng, LocationHint, RequestProfile, ALLOWED_MESSAGE_TYPES, BASE_OPTION_SETS};

use chathub_common::TurnId;
use chathub_config::ConversationStyle;
use tokio_util::sync::CancellationToken;

/// Input to one turn. Read-only to the client.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    pub prompt: String,
    /// Aggregated prior-turn or webpage context.
    pub webpage_context: String,
    pub image_url: Option<String>,
    /// Overrides the client's configured style for this turn.
    pub style: Option<ConversationStyle>,
    pub cancel: CancellationToken,
    /// Generated when absent.
    pub(crate) turn_id: Option<TurnId>,
    /// Set on the internal retry path only.
    pub(crate) disable_captcha_recovery: bool,
}

impl AskOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.webpage_context = context.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_style(mut self, style: ConversationStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn turn_id(&self) -> Option<&TurnId> {
        self.turn_id.as_ref()
    }

    /// Options for the single automatic retry after a resolved challenge.
    pub(crate) fn for_recovery_retry(&self) -> Self {
        Self {
            turn_id: None,
            disable_captcha_recovery: true,
            ..self.clone()
        }
    }
}
