use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::{ClientConfig, CookieJar};

type ServerSocket = WebSocketStream<TcpStream>;

// ---------------------------------------------------------------------------
// Scripted server
// ---------------------------------------------------------------------------

async fn serve_once<F, Fut>(script: F) -> String
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        script(ws).await;
    });
    format!("ws://{addr}/sydney/ChatHub")
}

async fn recv_text(ws: &mut ServerSocket) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
            Some(Ok(_)) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

/// Handshake, ack, ping and request, as every session starts.
async fn accept_turn(ws: &mut ServerSocket) -> String {
    assert_eq!(recv_text(ws).await, format!("{HANDSHAKE_FRAME}\u{1e}"));
    ws.send(Message::Text("{}\u{1e}".into())).await.unwrap();
    assert_eq!(recv_text(ws).await, format!("{PING_FRAME}\u{1e}"));
    recv_text(ws).await
}

async fn drain(ws: &mut ServerSocket) {
    while let Some(Ok(msg)) = ws.next().await {
        if msg.is_close() {
            break;
        }
    }
}

fn transport(url: &str) -> WebSocketTransport {
    let config = ClientConfig {
        wss_url: url.to_string(),
        ..ClientConfig::default()
    };
    WebSocketTransport::new(&config, CookieJar::from_header("_U=test"))
}

fn turn(conversation: Conversation, cancel: CancellationToken) -> TurnContext {
    TurnContext {
        conversation,
        request: r#"{"type":4,"target":"chat"}"#.to_string(),
        cancel,
    }
}

async fn run_collect(transport: WebSocketTransport, turn: TurnContext) -> Vec<RawFrame> {
    let (tx, mut rx) = mpsc::channel(1);
    let handle = tokio::spawn(async move { transport.run(turn, tx).await });
    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }
    handle.await.unwrap();
    frames
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn streams_frames_until_terminal() {
    let (req_tx, mut req_rx) = mpsc::channel(1);
    let url = serve_once(move |mut ws| async move {
        let request = accept_turn(&mut ws).await;
        req_tx.send(request).await.unwrap();
        ws.send(Message::Text(
            "{\"type\":1,\"n\":1}\u{1e}{\"type\":1,\"n\":2}\u{1e}".into(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text("{\"type\":2}\u{1e}{\"type\":1,\"n\":3}\u{1e}".into()))
            .await
            .unwrap();
        drain(&mut ws).await;
    })
    .await;

    let frames = run_collect(
        transport(&url),
        turn(Conversation::default(), CancellationToken::new()),
    )
    .await;

    assert_eq!(
        req_rx.recv().await.unwrap(),
        "{\"type\":4,\"target\":\"chat\"}\u{1e}"
    );
    // Nothing after the terminal frame is forwarded.
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], RawFrame::Data(serde_json::json!({"type": 1, "n": 1})));
    assert_eq!(frames[2], RawFrame::Data(serde_json::json!({"type": 2})));
}

#[tokio::test]
async fn read_loop_sends_keep_alive_after_request() {
    let (seen_tx, mut seen_rx) = mpsc::channel(1);
    let url = serve_once(move |mut ws| async move {
        accept_turn(&mut ws).await;
        // A one-second period is due on every iteration.
        let next = recv_text(&mut ws).await;
        seen_tx.send(next).await.unwrap();
        ws.send(Message::Text("{\"type\":2}\u{1e}".into())).await.unwrap();
        drain(&mut ws).await;
    })
    .await;

    let mut config = ClientConfig {
        wss_url: url,
        ..ClientConfig::default()
    };
    config.timeouts.keep_alive_period = std::time::Duration::from_secs(1);
    let transport = WebSocketTransport::new(&config, CookieJar::new());

    let frames = run_collect(
        transport,
        turn(Conversation::default(), CancellationToken::new()),
    )
    .await;

    assert_eq!(seen_rx.recv().await.unwrap(), format!("{PING_FRAME}\u{1e}"));
    assert_eq!(frames, vec![RawFrame::Data(serde_json::json!({"type": 2}))]);
}

#[tokio::test]
async fn access_token_is_sent_as_query_parameter() {
    let seen = Arc::new(Mutex::new(String::new()));
    let seen_server = Arc::clone(&seen);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            *seen_server.lock().unwrap() = req.uri().to_string();
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();
        accept_turn(&mut ws).await;
        ws.send(Message::Text("{\"type\":2}\u{1e}".into())).await.unwrap();
        drain(&mut ws).await;
    });

    let conversation = Conversation {
        sec_access_token: Some("a+b/c=".into()),
        ..Conversation::default()
    };
    let url = format!("ws://{addr}/sydney/ChatHub");
    run_collect(transport(&url), turn(conversation, CancellationToken::new())).await;

    assert_eq!(
        *seen.lock().unwrap(),
        "/sydney/ChatHub?sec_access_token=a%2Bb%2Fc%3D"
    );
}

#[tokio::test]
async fn rejected_upgrade_is_handshake_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        stream
            .write_all(b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap();
    });

    let url = format!("ws://{addr}/sydney/ChatHub");
    let frames = run_collect(
        transport(&url),
        turn(Conversation::default(), CancellationToken::new()),
    )
    .await;

    assert_eq!(frames.len(), 1);
    assert!(
        matches!(&frames[0], RawFrame::Error(ChatHubError::Handshake(msg)) if msg.contains("403")),
        "got {frames:?}"
    );
}

#[tokio::test]
async fn remote_close_is_transport_error() {
    let url = serve_once(|mut ws| async move {
        recv_text(&mut ws).await;
        let _ = ws
            .close(Some(CloseFrame {
                code: CloseCode::Policy,
                reason: "CAPTCHA required".into(),
            }))
            .await;
    })
    .await;

    let frames = run_collect(
        transport(&url),
        turn(Conversation::default(), CancellationToken::new()),
    )
    .await;

    assert_eq!(frames.len(), 1);
    let RawFrame::Error(err) = &frames[0] else {
        panic!("expected error, got {frames:?}");
    };
    assert_eq!(
        *err,
        ChatHubError::Transport("connection closed by remote: CAPTCHA required".into())
    );
    assert!(err.is_challenge());
}

#[tokio::test]
async fn malformed_record_is_protocol_error() {
    let url = serve_once(|mut ws| async move {
        accept_turn(&mut ws).await;
        ws.send(Message::Text("{\"type\":1}\u{1e}not json\u{1e}".into()))
            .await
            .unwrap();
        drain(&mut ws).await;
    })
    .await;

    let frames = run_collect(
        transport(&url),
        turn(Conversation::default(), CancellationToken::new()),
    )
    .await;

    assert_eq!(frames.len(), 2);
    assert!(matches!(frames[0], RawFrame::Data(_)));
    assert!(matches!(frames[1], RawFrame::Error(ChatHubError::Protocol(_))));
}

#[tokio::test]
async fn cancelled_turn_never_dials() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    // Nothing listens on the discard port.
    let frames = run_collect(
        transport("ws://127.0.0.1:9/sydney/ChatHub"),
        turn(Conversation::default(), cancel),
    )
    .await;
    assert!(frames.is_empty());
}

#[tokio::test]
async fn cancellation_mid_stream_is_silent() {
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let url = serve_once(move |mut ws| async move {
        accept_turn(&mut ws).await;
        ws.send(Message::Text("{\"type\":1}\u{1e}".into())).await.unwrap();
        server_cancel.cancel();
        drain(&mut ws).await;
    })
    .await;

    let frames = run_collect(transport(&url), turn(Conversation::default(), cancel)).await;
    assert!(frames
        .iter()
        .all(|f| !matches!(f, RawFrame::Error(_))));
}
