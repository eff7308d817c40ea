//! Duplex socket session for one turn.
//!
//! A [`FrameTransport`] owns the socket for the lifetime of a turn and
//! hands every decoded frame (or the single terminal error) to the
//! translator through a bounded channel.

mod frame;
mod request;
mod websocket;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ChatHubError, Conversation};

pub use frame::{split_records, HANDSHAKE_FRAME, PING_FRAME, RECORD_SEPARATOR};
pub use request::build_turn_request;
pub use websocket::WebSocketTransport;

/// One socket read result, handed to the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    Data(serde_json::Value),
    /// Terminal transport failure. Nothing follows it.
    Error(ChatHubError),
}

/// Everything a transport needs for one turn.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub conversation: Conversation,
    /// Serialized turn-request frame, without record separator.
    pub request: String,
    pub cancel: CancellationToken,
}

/// Runs one turn's socket session, sending frames until the turn ends.
///
/// Returning drops `frames`, which closes the channel. Errors observed
/// after cancellation are not reported.
#[async_trait]
pub trait FrameTransport: Send + Sync {
    async fn run(&self, turn: TurnContext, frames: mpsc::Sender<RawFrame>);
}
