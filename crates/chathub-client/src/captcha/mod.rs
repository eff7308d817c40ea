//! Out-of-band resolution of anti-automation challenges.

mod bypass;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use chathub_common::TurnId;

use crate::ChatHubError;

pub use bypass::{parse_bypass_response, BypassServerResolver};

/// The turn a challenge interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub conversation_id: String,
    pub turn_id: TurnId,
}

/// One challenge-resolution strategy.
///
/// Success means the next negotiated conversation should pass.
#[async_trait]
pub trait CaptchaResolver: Send + Sync {
    async fn resolve(
        &self,
        challenge: &Challenge,
        cancel: &CancellationToken,
    ) -> Result<(), ChatHubError>;
}

/// Built-in slot used when no solver has been installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableResolver;

#[async_trait]
impl CaptchaResolver for UnavailableResolver {
    async fn resolve(
        &self,
        _challenge: &Challenge,
        _cancel: &CancellationToken,
    ) -> Result<(), ChatHubError> {
        Err(ChatHubError::Unsupported(
            "no built-in CAPTCHA solver is installed; configure a bypass server".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_resolver_reports_unsupported() {
        let challenge = Challenge {
            conversation_id: "c".into(),
            turn_id: TurnId::new(),
        };
        let err = UnavailableResolver
            .resolve(&challenge, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatHubError::Unsupported(_)));
    }
}
