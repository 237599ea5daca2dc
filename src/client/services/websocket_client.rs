use crate::client::services::message_parser;
use crate::common::error::WebSocketError;
use crate::common::protocol::{ClientEvent, ServerEvent};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the connection delivers to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Server(ServerEvent),
    /// The connection dropped. Reported once; nothing reconnects on its own.
    Closed,
}

/// Owns the single live real-time connection of a session.
pub struct ConnectionManager {
    url: Url,
    user_id: Option<String>,
    outgoing: Option<mpsc::UnboundedSender<ClientEvent>>,
    reader: Option<JoinHandle<()>>,
    /// Cleared by the reader of the current connection once the server side is gone.
    alive: Arc<AtomicBool>,
    event_sender: mpsc::UnboundedSender<ConnectionEvent>,
    event_receiver: Option<mpsc::UnboundedReceiver<ConnectionEvent>>,
}

impl ConnectionManager {
    pub fn new(url: Url) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            url,
            user_id: None,
            outgoing: None,
            reader: None,
            alive: Arc::new(AtomicBool::new(false)),
            event_sender: tx,
            event_receiver: Some(rx),
        }
    }

    /// Receiver of connection events; can be taken only once and survives reconnects.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ConnectionEvent>> {
        self.event_receiver.take()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// True while the writer accepts events and the server has not closed the stream.
    pub fn is_connected(&self) -> bool {
        self.alive.load(Ordering::Acquire) && self.outgoing.as_ref().map(|tx| !tx.is_closed()).unwrap_or(false)
    }

    /// Open the connection for `user_id` with `token` attached and announce presence.
    ///
    /// No-op when already connected for the same user; a connection held for
    /// another user is torn down first.
    pub async fn establish(&mut self, user_id: &str, token: &str) -> Result<(), WebSocketError> {
        if self.is_connected() {
            if self.user_id.as_deref() == Some(user_id) {
                debug!("[WS:CLIENT] Already connected as {}", user_id);
                return Ok(());
            }
            info!("[WS:CLIENT] Switching connection from {:?} to {}", self.user_id, user_id);
        }
        self.teardown();

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WebSocketError::ConnectionFailed(format!("Invalid endpoint {}: {}", self.url, e)))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| WebSocketError::ConnectionFailed(format!("Invalid token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        info!("[WS:CLIENT] Connecting to {}", self.url);
        let (ws_stream, _) = connect_async(request).await.map_err(|e| {
            error!("[WS:CLIENT] Connection failed: {}", e);
            WebSocketError::ConnectionFailed(e.to_string())
        })?;
        info!("[WS:CLIENT] Connected to {}", self.url);

        let (ws_sender, ws_receiver) = ws_stream.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel::<ClientEvent>();

        // one flag per connection; readers of replaced connections only touch their own
        let alive = Arc::new(AtomicBool::new(true));
        tokio::spawn(Self::handle_outgoing(ws_sender, outgoing_rx));
        let events = self.event_sender.clone();
        self.reader = Some(tokio::spawn(Self::handle_incoming(ws_receiver, events, alive.clone())));
        self.alive = alive;
        self.outgoing = Some(outgoing_tx);
        self.user_id = Some(user_id.to_string());

        self.emit(ClientEvent::AddUser { user_id: user_id.to_string() })
    }

    /// Close the connection. Safe to call when nothing is open.
    pub fn teardown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.alive.store(false, Ordering::Release);
        // dropping the sender makes the writer send a Close frame and exit
        if self.outgoing.take().is_some() {
            info!("[WS:CLIENT] Connection for {:?} torn down", self.user_id);
        }
        self.user_id = None;
    }

    /// Queue an event for the writer task. Never waits for the server.
    pub fn emit(&self, event: ClientEvent) -> Result<(), WebSocketError> {
        let sender = self.outgoing.as_ref().ok_or(WebSocketError::NotConnected)?;
        sender.send(event).map_err(|_| {
            warn!("[WS:CLIENT] Failed to queue event - writer is gone");
            WebSocketError::SendFailed("connection writer stopped".to_string())
        })
    }

    pub fn join(&self, conversation_id: &str) -> Result<(), WebSocketError> {
        self.emit(ClientEvent::JoinRoom { conversation_id: conversation_id.to_string() })
    }

    pub fn leave(&self, conversation_id: &str) -> Result<(), WebSocketError> {
        self.emit(ClientEvent::LeaveRoom { conversation_id: conversation_id.to_string() })
    }

    pub fn send_message(&self, conversation_id: &str, sender_id: &str, text: &str) -> Result<(), WebSocketError> {
        self.emit(ClientEvent::SendMessage {
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
        })
    }

    pub fn typing(&self, conversation_id: &str, user_name: &str) -> Result<(), WebSocketError> {
        self.emit(ClientEvent::Typing {
            conversation_id: conversation_id.to_string(),
            user_name: user_name.to_string(),
        })
    }

    pub fn stop_typing(&self, conversation_id: &str, user_name: &str) -> Result<(), WebSocketError> {
        self.emit(ClientEvent::StopTyping {
            conversation_id: conversation_id.to_string(),
            user_name: user_name.to_string(),
        })
    }

    async fn handle_outgoing(
        mut ws_sender: SplitSink<WsStream, Message>,
        mut outgoing_rx: mpsc::UnboundedReceiver<ClientEvent>,
    ) {
        while let Some(event) = outgoing_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("[WS:CLIENT] Sending {}", json);
                    if let Err(e) = ws_sender.send(Message::Text(json)).await {
                        warn!("[WS:CLIENT] Failed to send event: {}", e);
                        return;
                    }
                }
                Err(e) => error!("[WS:CLIENT] Failed to serialize outgoing event: {}", e),
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
        debug!("[WS:CLIENT] Outgoing handler ended");
    }

    async fn handle_incoming(
        mut ws_receiver: SplitStream<WsStream>,
        events: mpsc::UnboundedSender<ConnectionEvent>,
        alive: Arc<AtomicBool>,
    ) {
        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => match message_parser::parse_server_event(&text) {
                    Ok(event) => {
                        if events.send(ConnectionEvent::Server(event)).is_err() {
                            debug!("[WS:CLIENT] Event receiver dropped, stopping reader");
                            return;
                        }
                    }
                    Err(e) => warn!("[WS:CLIENT] {} - raw: {}", e, text),
                },
                Ok(Message::Close(_)) => {
                    info!("[WS:CLIENT] Connection closed by server");
                    break;
                }
                // ping/pong are answered by tungstenite, binary is not part of the protocol
                Ok(_) => {}
                Err(e) => {
                    warn!("[WS:CLIENT] WebSocket error: {}", e);
                    break;
                }
            }
        }
        alive.store(false, Ordering::Release);
        let _ = events.send(ConnectionEvent::Closed);
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
