//! Error taxonomy for a turn.

/// Every failure that can end a turn.
///
/// Cloneable so it can ride inside [`crate::Event::Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatHubError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out during {0}")]
    Timeout(String),

    #[error("cannot establish a websocket connection: {0}")]
    Handshake(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("conversation creation failed: {0}")]
    Negotiation(String),

    #[error("http error: {0}")]
    Http(String),

    /// Terminal frame whose result status is not `Success`.
    #[error("remote error: value: {value}; message: {message}")]
    Remote { value: String, message: String },

    #[error("Looks like the user's message has triggered the content filter")]
    Filtered,

    #[error("Message revoke detected")]
    Revoked,

    #[error(
        "cannot resolve CAPTCHA automatically; please resolve it manually \
         on the website or mobile client: {0}"
    )]
    RecoveryFailed(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("cancelled")]
    Cancelled,
}

impl ChatHubError {
    /// Whether the socket layer failed. Dial and I/O timeouts and rejected
    /// upgrades are transport failures too; match on this rather than on
    /// [`ChatHubError::Transport`] alone.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatHubError::Transport(_) | ChatHubError::Timeout(_) | ChatHubError::Handshake(_)
        )
    }

    /// Whether this error reports an anti-automation challenge.
    ///
    /// Recognized by content, on transport and remote errors only.
    pub fn is_challenge(&self) -> bool {
        match self {
            ChatHubError::Transport(msg) => msg.contains("CAPTCHA"),
            ChatHubError::Remote { value, message } => {
                value.contains("CAPTCHA")
                    || message.contains("CAPTCHA")
                    || value.eq_ignore_ascii_case("CaptchaChallenge")
            }
            _ => false,
        }
    }
}
