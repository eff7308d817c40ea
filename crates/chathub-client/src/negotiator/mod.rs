//! Conversation negotiation: one request per turn that yields a [`Conversation`].

mod cookies;
mod headers;
mod http;

use async_trait::async_trait;

use crate::{ChatHubError, Conversation};

pub use cookies::CookieJar;
pub use headers::browser_headers;
pub use http::{parse_create_response, HttpNegotiator};

pub(crate) use headers::random_forwarded_ip;
pub(crate) use http::{build_http_client, map_reqwest_error};

/// Creates a fresh conversation. Called exactly once per turn, including
/// once per retry after challenge recovery. Implementations never retry.
#[async_trait]
pub trait ConversationNegotiator: Send + Sync {
    async fn create(&self) -> Result<Conversation, ChatHubError>;
}
