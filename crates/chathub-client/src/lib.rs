//! Streaming client for the ChatHub conversational service.
//!
//! A turn runs in three stages:
//! - session creation over HTTP (`negotiator`) yields a [`Conversation`]
//! - a duplex socket (`transport`) speaks the record-delimited JSON
//!   sub-protocol and hands every decoded frame to the translator
//! - the translator turns frames into typed [`Event`]s
//!
//! When the service answers with an anti-automation challenge the client
//! resolves it out-of-band (`captcha`) and re-runs the whole turn once.

pub mod attribution;
pub mod captcha;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod negotiator;
pub mod options;
pub mod transport;
pub mod translator;

#[cfg(test)]
mod test_support;

pub use attribution::{SourceAttribute, SourceAttributionAccumulator};
pub use captcha::{BypassServerResolver, CaptchaResolver, Challenge};
pub use client::{ChatHubClient, EventStream};
pub use config::{ClientConfig, Timeouts};
pub use conversation::Conversation;
pub use error::ChatHubError;
pub use event::{Event, EventKind, EventRecord, GenerativeImage};
pub use negotiator::{ConversationNegotiator, CookieJar, HttpNegotiator};
pub use options::{AskOptions, RequestProfile};
pub use transport::{FrameTransport, RawFrame, TurnContext, WebSocketTransport};
pub use translator::{EventTranslator, Translation};

pub use chathub_config::ConversationStyle;
