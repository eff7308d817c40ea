//! WebSocket-backed [`FrameTransport`].

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::frame::{encode_frame, keep_alive_due, split_records, unix_now};
use super::{FrameTransport, RawFrame, TurnContext, HANDSHAKE_FRAME, PING_FRAME};
use crate::negotiator::{browser_headers, random_forwarded_ip};
use crate::{ChatHubError, ClientConfig, Conversation, CookieJar, Timeouts};

const TERMINAL_FRAME_TYPE: i64 = 2;

/// Dials the chat socket once per turn.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    wss_url: String,
    timeouts: Timeouts,
    cookies: CookieJar,
    forwarded_ip: String,
}

impl WebSocketTransport {
    pub fn new(config: &ClientConfig, cookies: CookieJar) -> Self {
        Self {
            wss_url: config.wss_url.clone(),
            timeouts: config.timeouts,
            cookies,
            forwarded_ip: random_forwarded_ip(),
        }
    }

    fn socket_url(&self, conversation: &Conversation) -> String {
        match conversation.sec_access_token.as_deref() {
            Some(token) if !token.is_empty() => format!(
                "{}?sec_access_token={}",
                self.wss_url,
                urlencoding::encode(token)
            ),
            _ => self.wss_url.clone(),
        }
    }

    /// Dial and upgrade. `Ok(None)` when cancelled while dialing.
    async fn connect(
        &self,
        conversation: &Conversation,
        cancel: &CancellationToken,
    ) -> Result<Option<TransportSession>, ChatHubError> {
        let url = self.socket_url(conversation);
        info!(url = %self.wss_url, "Connecting to chat socket");

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ChatHubError::Handshake(e.to_string()))?;
        for (name, value) in browser_headers(&self.forwarded_ip, &self.cookies.header_value()) {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    request.headers_mut().insert(name, value);
                }
                Err(_) => warn!(header = name, "Skipping header with invalid value"),
            }
        }

        let dial = timeout(self.timeouts.dial, tokio_tungstenite::connect_async(request));
        let dialed = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            dialed = dial => dialed,
        };

        let (ws, response) = match dialed {
            Ok(Ok(pair)) => pair,
            Ok(Err(WsError::Http(response))) => {
                return Err(ChatHubError::Handshake(format!("HTTP {}", response.status())));
            }
            Ok(Err(e)) => return Err(ChatHubError::Transport(e.to_string())),
            Err(_elapsed) => return Err(ChatHubError::Timeout("dial".into())),
        };
        if response.status() != StatusCode::SWITCHING_PROTOCOLS {
            return Err(ChatHubError::Handshake(format!(
                "unexpected status {}",
                response.status()
            )));
        }
        debug!("Chat socket connected");

        Ok(Some(TransportSession {
            ws,
            timeouts: self.timeouts,
            cancel: cancel.clone(),
        }))
    }
}

#[async_trait]
impl FrameTransport for WebSocketTransport {
    async fn run(&self, turn: TurnContext, frames: mpsc::Sender<RawFrame>) {
        if turn.cancel.is_cancelled() {
            debug!("Turn cancelled before dial");
            return;
        }

        let result = match self.connect(&turn.conversation, &turn.cancel).await {
            Ok(Some(mut session)) => {
                let result = session.drive(&turn.request, &frames).await;
                session.close().await;
                result
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(err) = result {
            if turn.cancel.is_cancelled() {
                debug!(error = %err, "Dropping error observed after cancellation");
                return;
            }
            warn!(error = %err, "Chat socket session failed");
            let _ = frames.send(RawFrame::Error(err)).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One open socket. Closed by [`TransportSession::close`] on every exit path.
struct TransportSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    timeouts: Timeouts,
    cancel: CancellationToken,
}

impl TransportSession {
    async fn drive(
        &mut self,
        request: &str,
        frames: &mpsc::Sender<RawFrame>,
    ) -> Result<(), ChatHubError> {
        self.send_frame(HANDSHAKE_FRAME, "handshake write").await?;
        if self.read_batch().await?.is_none() {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            return Err(ChatHubError::Handshake(
                "socket closed before protocol acknowledgement".into(),
            ));
        }
        self.send_frame(PING_FRAME, "keep-alive write").await?;

        if self.cancel.is_cancelled() {
            return Ok(());
        }
        self.send_frame(request, "request write").await?;
        debug!("Turn request sent");

        let period = self.timeouts.keep_alive_period.as_secs();
        loop {
            if self.cancel.is_cancelled() {
                info!("Leaving read loop on cancellation");
                return Ok(());
            }
            if keep_alive_due(unix_now(), period) {
                self.send_frame(PING_FRAME, "keep-alive write").await?;
            }

            let Some(batch) = self.read_batch().await? else {
                debug!("Socket read loop ended");
                return Ok(());
            };

            for record in batch {
                let frame: Value = serde_json::from_str(&record)
                    .map_err(|e| ChatHubError::Protocol(format!("malformed json: {e}")))?;
                let terminal =
                    frame.get("type").and_then(Value::as_i64) == Some(TERMINAL_FRAME_TYPE);

                tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(()),
                    sent = frames.send(RawFrame::Data(frame)) => {
                        if sent.is_err() {
                            debug!("Frame receiver dropped");
                            return Ok(());
                        }
                    }
                }
                if terminal {
                    info!("Terminal frame received");
                    return Ok(());
                }
            }
        }
    }

    async fn send_frame(&mut self, payload: &str, what: &str) -> Result<(), ChatHubError> {
        let frame = encode_frame(payload);
        match timeout(self.timeouts.write, self.ws.send(WsMessage::Text(frame.into()))).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ChatHubError::Transport(e.to_string())),
            Err(_elapsed) => Err(ChatHubError::Timeout(what.to_string())),
        }
    }

    /// Next batch of records. `None` on cancellation or end of stream.
    async fn read_batch(&mut self) -> Result<Option<Vec<String>>, ChatHubError> {
        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(None),
                next = timeout(self.timeouts.read, self.ws.next()) => next,
            };

            match next {
                Err(_elapsed) => return Err(ChatHubError::Timeout("read".into())),
                Ok(None) => return Ok(None),
                Ok(Some(Err(e))) => return Err(ChatHubError::Transport(e.to_string())),
                Ok(Some(Ok(WsMessage::Text(text)))) => {
                    return Ok(Some(split_records(text.as_str())));
                }
                Ok(Some(Ok(WsMessage::Binary(bytes)))) => {
                    return Ok(Some(split_records(&String::from_utf8_lossy(&bytes))));
                }
                Ok(Some(Ok(WsMessage::Close(frame)))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .unwrap_or_default();
                    return Err(ChatHubError::Transport(format!(
                        "connection closed by remote: {reason}"
                    )));
                }
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    async fn close(&mut self) {
        let grace = self.timeouts.write.min(Duration::from_secs(2));
        match timeout(grace, self.ws.close(None)).await {
            Ok(Ok(())) => debug!("Chat socket closed"),
            Ok(Err(e)) => debug!(error = %e, "Chat socket close failed"),
            Err(_elapsed) => debug!("Chat socket close timed out"),
        }
    }
}
