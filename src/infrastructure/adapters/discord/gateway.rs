//! Discord gateway session
//!
//! Speaks just enough of the v10 JSON gateway protocol to receive
//! `MESSAGE_CREATE` events: HELLO, IDENTIFY, READY, heartbeats, and
//! reconnects with a fresh IDENTIFY.

use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::application::errors::BotError;
use crate::domain::entities::{Message, User};
use crate::domain::traits::BotInfo;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

/// Gateway opcodes
mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Gateway intents
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

const MAX_RETRIES: u32 = 5;
const INITIAL_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Raw gateway payload
#[derive(Debug, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    pub s: Option<u64>,
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hello {
    heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
struct Ready {
    user: DiscordUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    pub author: DiscordUser,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
struct Identify<'a> {
    op: u8,
    d: IdentifyData<'a>,
}

#[derive(Serialize)]
struct IdentifyData<'a> {
    token: &'a str,
    intents: u64,
    properties: IdentifyProperties,
}

#[derive(Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

#[derive(Serialize)]
struct Heartbeat {
    op: u8,
    d: Option<u64>,
}

impl From<DiscordUser> for User {
    fn from(user: DiscordUser) -> Self {
        User::new(user.id).with_username(user.username)
    }
}

impl From<MessageCreate> for Message {
    fn from(event: MessageCreate) -> Self {
        Message::new(event.channel_id, event.author.into(), event.content).with_id(event.id)
    }
}

/// Close codes after which reconnecting cannot succeed
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010 | 4011 | 4012 | 4013 | 4014)
}

fn close_error(code: u16, reason: &str) -> BotError {
    if code == 4004 {
        BotError::Auth(format!("Gateway rejected token: {}", reason))
    } else {
        BotError::Gateway(format!("Gateway closed with {}: {}", code, reason))
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, BotError> {
    serde_json::from_value(value).map_err(|e| BotError::Parse(e.to_string()))
}

/// What the session loop should do after a frame
enum Frame {
    Message(Message),
    Continue,
    Reconnect,
}

/// A live, identified gateway connection
pub struct GatewaySession {
    url: String,
    token: String,
    intents: u64,
    ws_tx: WsSink,
    ws_rx: WsSource,
    heartbeat: Interval,
    sequence: Option<u64>,
    awaiting_ack: bool,
    retry_delay: Duration,
}

impl GatewaySession {
    /// Connect, identify, and wait for READY
    pub async fn open(
        url: impl Into<String>,
        token: impl Into<String>,
        intents: u64,
    ) -> Result<(Self, BotInfo), BotError> {
        let url = url.into();
        let (ws_tx, ws_rx) = Self::connect(&url).await?;

        let mut session = Self {
            url,
            token: token.into(),
            intents,
            ws_tx,
            ws_rx,
            heartbeat: tokio::time::interval(Duration::from_secs(45)),
            sequence: None,
            awaiting_ack: false,
            retry_delay: INITIAL_DELAY,
        };

        let info = session.handshake().await?;
        Ok((session, info))
    }

    #[cfg(test)]
    fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn connect(url: &str) -> Result<(WsSink, WsSource), BotError> {
        tracing::debug!("Connecting to gateway {}", url);
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| BotError::Network(format!("Gateway connection failed: {}", e)))?;
        Ok(stream.split())
    }

    /// HELLO, IDENTIFY, READY
    async fn handshake(&mut self) -> Result<BotInfo, BotError> {
        let hello = self.read_payload().await?;
        if hello.op != op::HELLO {
            return Err(BotError::Gateway(format!("Expected HELLO, got op {}", hello.op)));
        }
        let hello: Hello = decode(hello.d)?;
        self.reset_heartbeat(Duration::from_millis(hello.heartbeat_interval));

        self.identify().await?;

        loop {
            let payload = self.read_payload().await?;
            match payload.op {
                op::DISPATCH => {
                    self.sequence = payload.s.or(self.sequence);
                    if payload.t.as_deref() == Some("READY") {
                        let ready: Ready = decode(payload.d)?;
                        tracing::info!("Gateway ready as {} ({})", ready.user.username, ready.user.id);
                        return Ok(BotInfo {
                            id: ready.user.id,
                            username: ready.user.username,
                        });
                    }
                }
                op::HEARTBEAT => self.send_heartbeat().await?,
                op::HEARTBEAT_ACK => self.awaiting_ack = false,
                op::INVALID_SESSION => {
                    return Err(BotError::Gateway("Session invalidated during identify".to_string()));
                }
                other => tracing::trace!("Ignoring op {} during handshake", other),
            }
        }
    }

    fn reset_heartbeat(&mut self, period: Duration) {
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.heartbeat = heartbeat;
        self.awaiting_ack = false;
    }

    async fn identify(&mut self) -> Result<(), BotError> {
        let identify = Identify {
            op: op::IDENTIFY,
            d: IdentifyData {
                token: &self.token,
                intents: self.intents,
                properties: IdentifyProperties {
                    os: std::env::consts::OS,
                    browser: "ntfy-bot",
                    device: "ntfy-bot",
                },
            },
        };
        let text = serde_json::to_string(&identify).map_err(|e| BotError::Internal(e.to_string()))?;
        self.send_text(text).await
    }

    async fn send_heartbeat(&mut self) -> Result<(), BotError> {
        let heartbeat = Heartbeat { op: op::HEARTBEAT, d: self.sequence };
        let text = serde_json::to_string(&heartbeat).map_err(|e| BotError::Internal(e.to_string()))?;
        tracing::trace!("Sending heartbeat (seq {:?})", self.sequence);
        self.awaiting_ack = true;
        self.send_text(text).await
    }

    async fn send_text(&mut self, text: String) -> Result<(), BotError> {
        self.ws_tx
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| BotError::Network(e.to_string()))
    }

    /// Read the next JSON payload, failing on close
    async fn read_payload(&mut self) -> Result<GatewayPayload, BotError> {
        loop {
            match self.ws_rx.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    return serde_json::from_str(text.as_str()).map_err(|e| BotError::Parse(e.to_string()));
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Err(e) = self.ws_tx.send(WsMessage::Pong(data)).await {
                        tracing::debug!("Failed to send pong: {}", e);
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_string()))
                        .unwrap_or((1000, String::new()));
                    return Err(close_error(code, &reason));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(BotError::Network(e.to_string())),
                None => return Err(BotError::Gateway("Gateway stream ended".to_string())),
            }
        }
    }

    /// Wait for the next inbound chat message, keeping the connection alive
    pub async fn next_message(&mut self) -> Result<Message, BotError> {
        loop {
            let frame = tokio::select! {
                _ = self.heartbeat.tick() => {
                    if self.awaiting_ack {
                        tracing::warn!("No heartbeat ACK from gateway");
                        Frame::Reconnect
                    } else {
                        self.send_heartbeat().await?;
                        Frame::Continue
                    }
                }
                msg = self.ws_rx.next() => self.handle_frame(msg).await?,
            };

            match frame {
                Frame::Message(message) => return Ok(message),
                Frame::Continue => {}
                Frame::Reconnect => self.reconnect().await?,
            }
        }
    }

    async fn handle_frame(&mut self, msg: Option<Result<WsMessage, Error>>) -> Result<Frame, BotError> {
        match msg {
            Some(Ok(WsMessage::Text(text))) => match serde_json::from_str::<GatewayPayload>(text.as_str()) {
                Ok(payload) => self.handle_payload(payload).await,
                Err(e) => {
                    tracing::warn!("Dropping undecodable gateway payload: {}", e);
                    Ok(Frame::Continue)
                }
            },
            Some(Ok(WsMessage::Ping(data))) => {
                if let Err(e) = self.ws_tx.send(WsMessage::Pong(data)).await {
                    tracing::debug!("Failed to send pong: {}", e);
                }
                Ok(Frame::Continue)
            }
            Some(Ok(WsMessage::Close(frame))) => {
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.as_str().to_string()))
                    .unwrap_or((1000, String::new()));
                if is_fatal_close(code) {
                    return Err(close_error(code, &reason));
                }
                tracing::info!("Gateway closed connection ({}: {})", code, reason);
                Ok(Frame::Reconnect)
            }
            Some(Ok(_)) => Ok(Frame::Continue),
            Some(Err(e)) => {
                tracing::warn!("Gateway error: {}", e);
                Ok(Frame::Reconnect)
            }
            None => {
                tracing::info!("Gateway stream ended");
                Ok(Frame::Reconnect)
            }
        }
    }

    async fn handle_payload(&mut self, payload: GatewayPayload) -> Result<Frame, BotError> {
        match payload.op {
            op::DISPATCH => {
                self.sequence = payload.s.or(self.sequence);
                match payload.t.as_deref() {
                    Some("MESSAGE_CREATE") => match decode::<MessageCreate>(payload.d) {
                        Ok(event) => Ok(Frame::Message(event.into())),
                        Err(e) => {
                            tracing::warn!("Dropping malformed MESSAGE_CREATE: {}", e);
                            Ok(Frame::Continue)
                        }
                    },
                    Some(other) => {
                        tracing::trace!("Ignoring dispatch {}", other);
                        Ok(Frame::Continue)
                    }
                    None => Ok(Frame::Continue),
                }
            }
            op::HEARTBEAT => {
                self.send_heartbeat().await?;
                Ok(Frame::Continue)
            }
            op::HEARTBEAT_ACK => {
                self.awaiting_ack = false;
                Ok(Frame::Continue)
            }
            op::RECONNECT => {
                tracing::info!("Gateway requested reconnect");
                Ok(Frame::Reconnect)
            }
            op::INVALID_SESSION => {
                tracing::warn!("Gateway invalidated session");
                Ok(Frame::Reconnect)
            }
            other => {
                tracing::trace!("Ignoring op {}", other);
                Ok(Frame::Continue)
            }
        }
    }

    /// Drop the current socket and identify again on a new one
    async fn reconnect(&mut self) -> Result<(), BotError> {
        let _ = self.ws_tx.close().await;

        let mut delay = self.retry_delay;
        let mut last_error = None;
        for attempt in 1..=MAX_RETRIES {
            tracing::warn!("Reconnecting to gateway in {:?} (attempt {}/{})", delay, attempt, MAX_RETRIES);
            tokio::time::sleep(delay).await;

            match self.try_reconnect().await {
                Ok(()) => {
                    tracing::info!("Reconnected to gateway");
                    return Ok(());
                }
                Err(e @ BotError::Auth(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!("Reconnect failed: {}", e);
                    last_error = Some(e);
                    delay = std::cmp::min(delay * 2, MAX_DELAY);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BotError::Gateway("Reconnect failed".to_string())))
    }

    async fn try_reconnect(&mut self) -> Result<(), BotError> {
        let (ws_tx, ws_rx) = Self::connect(&self.url).await?;
        self.ws_tx = ws_tx;
        self.ws_rx = ws_rx;
        self.sequence = None;
        self.handshake().await.map(|_| ())
    }

    /// Close the connection with a normal close frame
    pub async fn close(mut self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "shutting down".into(),
        };
        if let Err(e) = self.ws_tx.send(WsMessage::Close(Some(frame))).await {
            tracing::debug!("Failed to send close frame: {}", e);
        }
        let _ = self.ws_tx.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[test]
    fn test_message_create_conversion() {
        let payload: GatewayPayload = serde_json::from_value(json!({
            "op": 0,
            "s": 3,
            "t": "MESSAGE_CREATE",
            "d": {
                "id": "555",
                "channel_id": "777",
                "author": {"id": "42", "username": "phil"},
                "content": "!gh dark mode"
            }
        }))
        .unwrap();

        let event: MessageCreate = decode(payload.d).unwrap();
        let message: Message = event.into();
        assert_eq!(message.id, "555");
        assert_eq!(message.channel_id, "777");
        assert_eq!(message.author.id, "42");
        assert_eq!(message.author.username.as_deref(), Some("phil"));
        assert_eq!(message.content, "!gh dark mode");
    }

    #[test]
    fn test_fatal_close_codes() {
        assert!(is_fatal_close(4004));
        assert!(is_fatal_close(4014));
        assert!(!is_fatal_close(1000));
        assert!(!is_fatal_close(4000));
        assert!(matches!(close_error(4004, "Authentication failed."), BotError::Auth(_)));
        assert!(matches!(close_error(4013, "Invalid intent(s)."), BotError::Gateway(_)));
    }

    async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: Value) {
        ws.send(WsMessage::Text(value.to_string().into())).await.unwrap();
    }

    async fn recv_json(ws: &mut WebSocketStream<TcpStream>) -> Value {
        loop {
            match ws.next().await.unwrap().unwrap() {
                WsMessage::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_open_and_receive_message() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            send_json(&mut ws, json!({"op": 10, "d": {"heartbeat_interval": 45000}})).await;
            let identify = recv_json(&mut ws).await;

            send_json(&mut ws, json!({
                "op": 0, "s": 1, "t": "READY",
                "d": {"user": {"id": "1000", "username": "ntfybot", "bot": true}}
            }))
            .await;
            send_json(&mut ws, json!({"op": 0, "s": 2, "t": "GUILD_CREATE", "d": {}})).await;
            send_json(&mut ws, json!({
                "op": 0, "s": 3, "t": "MESSAGE_CREATE",
                "d": {"id": "9", "channel_id": "77", "author": {"id": "42", "username": "phil"}, "content": "!help"}
            }))
            .await;
            identify
        });

        let intents = INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;
        let (mut session, info) = GatewaySession::open(url, "secret-token", intents).await.unwrap();
        assert_eq!(info.id, "1000");
        assert_eq!(info.username, "ntfybot");

        let message = session.next_message().await.unwrap();
        assert_eq!(message.channel_id, "77");
        assert_eq!(message.content, "!help");

        let identify = server.await.unwrap();
        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "secret-token");
        assert_eq!(identify["d"]["intents"], 33280);
        session.close().await;
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            send_json(&mut ws, json!({"op": 10, "d": {"heartbeat_interval": 45000}})).await;
            let _identify = recv_json(&mut ws).await;
            let frame = CloseFrame {
                code: CloseCode::from(4004),
                reason: "Authentication failed.".into(),
            };
            let _ = ws.send(WsMessage::Close(Some(frame))).await;
        });

        let result = GatewaySession::open(url, "bad-token", INTENT_GUILD_MESSAGES).await;
        assert!(matches!(result, Err(BotError::Auth(_))));
    }

    type ServerWs = WebSocketStream<TcpStream>;

    const INTENTS: u64 = INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    async fn accept(listener: &TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.unwrap();
        accept_async(stream).await.unwrap()
    }

    /// HELLO, wait for IDENTIFY, READY at sequence 1
    async fn serve_handshake(ws: &mut ServerWs, heartbeat_interval: u64) -> Value {
        send_json(ws, json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval}})).await;
        let identify = recv_json(ws).await;
        send_json(ws, json!({
            "op": 0, "s": 1, "t": "READY",
            "d": {"user": {"id": "1000", "username": "ntfybot"}}
        }))
        .await;
        identify
    }

    async fn send_message_create(ws: &mut ServerWs, content: &str) {
        send_json(ws, json!({
            "op": 0, "s": 2, "t": "MESSAGE_CREATE",
            "d": {"id": "9", "channel_id": "77", "author": {"id": "42", "username": "phil"}, "content": content}
        }))
        .await;
    }

    async fn open_session(url: String) -> GatewaySession {
        let (session, _info) = GatewaySession::open(url, "secret-token", INTENTS).await.unwrap();
        session.with_retry_delay(Duration::from_millis(5))
    }

    /// The server sends `trigger` on the first connection; the session must
    /// identify again on a second one and keep delivering messages.
    async fn assert_reidentifies_after(trigger: WsMessage) {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut first = accept(&listener).await;
            serve_handshake(&mut first, 45000).await;
            first.send(trigger).await.unwrap();

            let mut second = accept(&listener).await;
            let identify = serve_handshake(&mut second, 45000).await;
            send_message_create(&mut second, "after reconnect").await;
            identify
        });

        let mut session = open_session(url).await;
        let message = session.next_message().await.unwrap();
        assert_eq!(message.content, "after reconnect");

        let identify = server.await.unwrap();
        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "secret-token");
    }

    #[tokio::test]
    async fn test_reconnect_request_reidentifies() {
        assert_reidentifies_after(WsMessage::Text(json!({"op": 7, "d": null}).to_string().into())).await;
    }

    #[tokio::test]
    async fn test_invalid_session_reidentifies() {
        assert_reidentifies_after(WsMessage::Text(json!({"op": 9, "d": false}).to_string().into())).await;
    }

    #[tokio::test]
    async fn test_server_close_reidentifies() {
        let frame = CloseFrame {
            code: CloseCode::from(4000),
            reason: "Unknown error".into(),
        };
        assert_reidentifies_after(WsMessage::Close(Some(frame))).await;
    }

    #[tokio::test]
    async fn test_heartbeat_request_answered() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            serve_handshake(&mut ws, 45000).await;
            send_json(&mut ws, json!({"op": 1, "d": null})).await;
            let heartbeat = recv_json(&mut ws).await;
            send_message_create(&mut ws, "!help").await;
            heartbeat
        });

        let mut session = open_session(url).await;
        let message = session.next_message().await.unwrap();
        assert_eq!(message.content, "!help");

        let heartbeat = server.await.unwrap();
        assert_eq!(heartbeat["op"], 1);
        assert_eq!(heartbeat["d"], 1);
    }

    #[tokio::test]
    async fn test_missed_heartbeat_ack_reconnects() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut first = accept(&listener).await;
            serve_handshake(&mut first, 50).await;
            let unanswered = recv_json(&mut first).await;

            let mut second = accept(&listener).await;
            let identify = serve_handshake(&mut second, 45000).await;
            send_message_create(&mut second, "after zombie").await;
            (unanswered, identify)
        });

        let mut session = open_session(url).await;
        let message = session.next_message().await.unwrap();
        assert_eq!(message.content, "after zombie");

        let (unanswered, identify) = server.await.unwrap();
        assert_eq!(unanswered["op"], 1);
        assert_eq!(identify["op"], 2);
    }

    #[tokio::test]
    async fn test_auth_close_after_ready_not_retried() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            serve_handshake(&mut ws, 45000).await;
            let frame = CloseFrame {
                code: CloseCode::from(4004),
                reason: "Authentication failed.".into(),
            };
            ws.send(WsMessage::Close(Some(frame))).await.unwrap();

            // no second connection may arrive
            tokio::time::timeout(Duration::from_millis(300), listener.accept())
                .await
                .is_err()
        });

        let mut session = open_session(url).await;
        assert!(matches!(session.next_message().await, Err(BotError::Auth(_))));
        assert!(server.await.unwrap(), "session reconnected after a fatal close");
    }

    #[tokio::test]
    async fn test_reconnect_gives_up_after_retries() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            serve_handshake(&mut ws, 45000).await;
            drop(listener);
            send_json(&mut ws, json!({"op": 7, "d": null})).await;
            ws
        });

        let mut session = open_session(url).await;
        let result = session.next_message().await;
        assert!(matches!(result, Err(BotError::Network(_))));
        drop(server.await.unwrap());
    }

    #[tokio::test]
    async fn test_wss_handshake_failure_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("wss://localhost:{}/?v=10&encoding=json", listener.local_addr().unwrap().port());

        tokio::spawn(async move {
            // plain TCP peer: the TLS handshake can never complete
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        match tokio::spawn(GatewaySession::open(url, "t", 0)).await {
            Ok(Err(BotError::Network(_))) => {}
            Ok(Err(e)) => panic!("unexpected error: {}", e),
            Ok(Ok(_)) => panic!("TLS handshake against a plain TCP peer succeeded"),
            Err(e) => panic!("connect task panicked: {}", e),
        }
    }
}
