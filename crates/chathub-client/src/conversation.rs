//! Conversation identity issued by session creation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one negotiated conversation. Owned by the turn that
/// created it and never reused across turns.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    pub client_id: String,
    #[serde(default)]
    pub conversation_signature: Option<String>,
    /// Short-lived socket token, sent as the `sec_access_token` query parameter.
    #[serde(default)]
    pub sec_access_token: Option<String>,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("conversation_id", &self.conversation_id)
            .field("client_id", &self.client_id)
            .field(
                "conversation_signature",
                &self.conversation_signature.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "sec_access_token",
                &self.sec_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
