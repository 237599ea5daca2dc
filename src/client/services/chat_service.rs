use crate::client::models::composer::Composer;
use crate::client::models::conversation_view::ConversationView;
use crate::client::models::typing::{TypingAction, TypingDebouncer};
use crate::client::services::api::ApiService;
use crate::client::services::history_loader;
use crate::client::services::websocket_client::{ConnectionEvent, ConnectionManager};
use crate::common::error::WebSocketError;
use crate::common::models::{ChatMessage, Conversation, Notification, Session};
use crate::common::protocol::{ServerEvent, MAX_MESSAGE_LENGTH};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

/// What changed after handling a connection event, for the front end to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatUpdate {
    Message(ChatMessage),
    /// Peer typing indicator changed; `None` means nobody is typing.
    Typing(Option<String>),
    OnlineUsers(Vec<String>),
    Notification(Notification),
    ServerError(String),
    Disconnected,
    Nothing,
}

/// Chat layer of a session: one connection, one open conversation at a time.
pub struct ChatService {
    api: Arc<dyn ApiService>,
    connection: ConnectionManager,
    view: ConversationView,
    typing: TypingDebouncer,
    /// Room joined for the open conversation.
    joined_room: Option<String>,
    online_users: Vec<String>,
    notifications: Vec<Notification>,
}

impl ChatService {
    pub fn new(api: Arc<dyn ApiService>, websocket_url: Url, typing_idle: Duration) -> Self {
        Self {
            api,
            connection: ConnectionManager::new(websocket_url),
            view: ConversationView::new(),
            typing: TypingDebouncer::new(typing_idle),
            joined_room: None,
            online_users: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ConnectionEvent>> {
        self.connection.take_events()
    }

    pub fn view(&self) -> &ConversationView {
        &self.view
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager {
        &mut self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn online_users(&self) -> &[String] {
        &self.online_users
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Ensure the session's connection is up, rejoining the open conversation's room
    /// after a drop.
    pub async fn connect(&mut self, session: &Session) -> Result<(), WebSocketError> {
        self.connection.establish(&session.user.id, &session.token).await?;
        if self.joined_room.is_none() {
            if let Some(id) = self.view.conversation_id().map(str::to_string) {
                self.connection.join(&id)?;
                self.joined_room = Some(id);
            }
        }
        Ok(())
    }

    /// Leave the open room and close the connection (logout, shutdown).
    pub fn disconnect(&mut self, session: &Session) {
        self.close_conversation(session);
        self.connection.teardown();
        self.online_users.clear();
    }

    /// Open `conversation`: history is fetched while the connection is ensured and
    /// the room joined; live messages arriving meanwhile wait for the history.
    ///
    /// History is applied even when the connection could not be established; the
    /// connection error is returned afterwards.
    pub async fn open_conversation(&mut self, session: &Session, conversation: Conversation) -> Result<(), WebSocketError> {
        if self.view.is_open_for(&conversation.id) {
            return Ok(());
        }
        self.close_conversation(session);

        let conversation_id = conversation.id.clone();
        info!("[CHAT] Opening conversation {}", conversation_id);
        self.view.open(conversation);

        let api = self.api.clone();
        let (history, joined) = tokio::join!(
            history_loader::load_history(api.as_ref(), &conversation_id),
            Self::connect_and_join(&mut self.connection, session, &conversation_id),
        );

        self.view.apply_history(&conversation_id, history);
        match joined {
            Ok(()) => {
                self.joined_room = Some(conversation_id);
                Ok(())
            }
            Err(e) => {
                error!("[CHAT] Live updates unavailable for {}: {}", conversation_id, e);
                Err(e)
            }
        }
    }

    async fn connect_and_join(
        connection: &mut ConnectionManager,
        session: &Session,
        conversation_id: &str,
    ) -> Result<(), WebSocketError> {
        connection.establish(&session.user.id, &session.token).await?;
        connection.join(conversation_id)
    }

    /// Leave the room and detach the view. No-op when nothing is open.
    pub fn close_conversation(&mut self, session: &Session) {
        if let Some(room) = self.joined_room.take() {
            if self.typing.sent() == TypingAction::StopTyping {
                if let Err(e) = self.connection.stop_typing(&room, &session.user.name) {
                    debug!("[CHAT] Stop typing for {} not sent: {}", room, e);
                }
            }
            if let Err(e) = self.connection.leave(&room) {
                debug!("[CHAT] Leave for {} not sent: {}", room, e);
            }
        }
        self.typing.reset();
        self.view.close();
    }

    /// Keystroke in the message input of the open conversation.
    pub fn on_input(&mut self, session: &Session) {
        let Some(room) = self.joined_room.as_deref() else {
            return;
        };
        if self.typing.keystroke(Instant::now()) == TypingAction::Typing {
            if let Err(e) = self.connection.typing(room, &session.user.name) {
                debug!("[CHAT] Typing signal not sent: {}", e);
            }
        }
    }

    /// Idle check for the typing indicator; call periodically.
    pub fn tick(&mut self, session: &Session) {
        if self.typing.tick(Instant::now()) == TypingAction::StopTyping {
            if let Some(room) = self.joined_room.as_deref() {
                if let Err(e) = self.connection.stop_typing(room, &session.user.name) {
                    debug!("[CHAT] Stop typing for {} not sent: {}", room, e);
                }
            }
        }
    }

    /// When the pending stop-typing signal is due, if any.
    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    /// Send `text` to `conversation_id`.
    ///
    /// Returns `Ok(false)` without emitting anything when `text` is blank, and
    /// `InvalidMessage` when it is longer than [`MAX_MESSAGE_LENGTH`]. The
    /// send does not wait for the server; the message shows up when the room
    /// broadcast echoes it back. Persistence runs in the background.
    pub fn send(&mut self, session: &Session, conversation_id: &str, text: &str) -> Result<bool, WebSocketError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let length = text.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(WebSocketError::InvalidMessage(format!(
                "message is {} characters, the limit is {}",
                length, MAX_MESSAGE_LENGTH
            )));
        }
        self.connection.send_message(conversation_id, &session.user.id, text)?;
        if self.typing.sent() == TypingAction::StopTyping {
            if let Err(e) = self.connection.stop_typing(conversation_id, &session.user.name) {
                debug!("[CHAT] Stop typing for {} not sent: {}", conversation_id, e);
            }
        }

        let api = self.api.clone();
        let (conversation_id, sender_id, text) = (conversation_id.to_string(), session.user.id.clone(), text.to_string());
        tokio::spawn(async move {
            if let Err(e) = api.create_message(&conversation_id, &sender_id, &text).await {
                error!("[CHAT] Failed to persist message in {}: {}", conversation_id, e);
            }
        });
        Ok(true)
    }

    /// Send the composer's content to the open conversation; the input is cleared
    /// only when something was sent.
    pub fn submit(&mut self, session: &Session, composer: &mut Composer) -> Result<bool, WebSocketError> {
        let Some(text) = composer.outgoing().map(str::to_string) else {
            return Ok(false);
        };
        let conversation_id = self
            .view
            .conversation_id()
            .map(str::to_string)
            .ok_or(WebSocketError::NotConnected)?;
        let sent = self.send(session, &conversation_id, &text)?;
        if sent {
            composer.clear();
        }
        Ok(sent)
    }

    /// Flip the read flag of a message, locally and on the backend.
    pub async fn mark_read(&mut self, message_id: &str) -> bool {
        match self.api.mark_message_read(message_id).await {
            Ok(()) => self.view.mark_read(message_id),
            Err(e) => {
                warn!("[CHAT] Failed to mark {} read: {}", message_id, e);
                false
            }
        }
    }

    /// Apply a connection event to local state.
    pub fn handle_event(&mut self, event: ConnectionEvent) -> ChatUpdate {
        match event {
            ConnectionEvent::Server(ServerEvent::ReceiveMessage { message }) => {
                if self.view.receive(message.clone()) {
                    ChatUpdate::Message(message)
                } else {
                    ChatUpdate::Nothing
                }
            }
            ConnectionEvent::Server(ServerEvent::UserTyping { conversation_id, user_name }) => {
                self.typing_update(&conversation_id, &user_name, true)
            }
            ConnectionEvent::Server(ServerEvent::UserStoppedTyping { conversation_id, user_name }) => {
                self.typing_update(&conversation_id, &user_name, false)
            }
            ConnectionEvent::Server(ServerEvent::OnlineUsers { user_ids }) => {
                self.online_users = user_ids.clone();
                ChatUpdate::OnlineUsers(user_ids)
            }
            ConnectionEvent::Server(ServerEvent::Notification { notification }) => {
                self.notifications.push(notification.clone());
                ChatUpdate::Notification(notification)
            }
            ConnectionEvent::Server(ServerEvent::Error { message }) => {
                warn!("[CHAT] Server reported: {}", message);
                ChatUpdate::ServerError(message)
            }
            ConnectionEvent::Closed => {
                if self.connection.is_connected() {
                    // queued by a connection that has since been replaced
                    debug!("[CHAT] Ignoring close of a replaced connection");
                    return ChatUpdate::Nothing;
                }
                warn!("[CHAT] Real-time connection lost");
                self.connection.teardown();
                self.joined_room = None;
                self.typing.reset();
                ChatUpdate::Disconnected
            }
        }
    }

    fn typing_update(&mut self, conversation_id: &str, user_name: &str, typing: bool) -> ChatUpdate {
        let before = self.view.peer_typing().map(str::to_string);
        self.view.set_peer_typing(conversation_id, user_name, typing);
        let after = self.view.peer_typing().map(str::to_string);
        if before == after {
            ChatUpdate::Nothing
        } else {
            ChatUpdate::Typing(after)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::conversation_view::ViewPhase;
    use crate::client::services::api::mock::{message, user, MockApi};
    use crate::common::models::Role;
    use crate::common::protocol::ClientEvent;
    use chrono::Utc;
    use tokio::time::timeout;

    fn session() -> Session {
        Session { user: user("me", Role::Candidate), token: "jwt".into() }
    }

    fn conversation() -> Conversation {
        Conversation { id: "c1".into(), members: ["me".into(), "bob".into()], created_at: Utc::now() }
    }

    fn service(api: Arc<MockApi>) -> ChatService {
        // port 9 (discard) is closed on test hosts, so connecting fails fast
        ChatService::new(api, Url::parse("ws://127.0.0.1:9/ws").unwrap(), Duration::from_millis(1000))
    }

    #[tokio::test]
    async fn whitespace_send_is_a_noop() {
        let api = Arc::new(MockApi::new());
        let mut chat = service(api.clone());
        let mut composer = Composer::new();
        composer.set("   \n ");
        assert_eq!(chat.submit(&session(), &mut composer), Ok(false));
        assert_eq!(composer.input(), "   \n ");
        assert_eq!(chat.send(&session(), "c1", "  "), Ok(false));
        tokio::task::yield_now().await;
        assert_eq!(api.call_count("create_message"), 0);
    }

    #[tokio::test]
    async fn oversized_message_is_rejected_and_kept() {
        let api = Arc::new(MockApi::new());
        let mut chat = service(api.clone());
        let mut composer = Composer::new();
        composer.set("x".repeat(MAX_MESSAGE_LENGTH + 1));
        let _ = chat.open_conversation(&session(), conversation()).await;

        assert!(matches!(chat.submit(&session(), &mut composer), Err(WebSocketError::InvalidMessage(_))));
        assert_eq!(composer.input().len(), MAX_MESSAGE_LENGTH + 1);
        tokio::task::yield_now().await;
        assert_eq!(api.call_count("create_message"), 0);
    }

    #[tokio::test]
    async fn failed_send_keeps_input() {
        let api = Arc::new(MockApi::new());
        let mut chat = service(api);
        let mut composer = Composer::new();
        composer.set("hello");
        assert!(chat.submit(&session(), &mut composer).is_err());
        assert_eq!(composer.input(), "hello");
    }

    #[tokio::test]
    async fn open_without_connection_still_shows_history() {
        let api = Arc::new(MockApi::new());
        api.messages.lock().unwrap().insert("c1".into(), vec![message("h1", "c1", "bob", "hi", 1)]);
        let mut chat = service(api);

        let result = chat.open_conversation(&session(), conversation()).await;
        assert!(matches!(result, Err(WebSocketError::ConnectionFailed(_))));
        assert_eq!(chat.view().phase(), &ViewPhase::Live);
        assert_eq!(chat.view().messages().len(), 1);

        chat.close_conversation(&session());
        assert_eq!(chat.view().phase(), &ViewPhase::Closed);
    }

    #[tokio::test]
    async fn events_update_view_and_report_changes() {
        let api = Arc::new(MockApi::new());
        let mut chat = service(api);
        let _ = chat.open_conversation(&session(), conversation()).await;

        let m = message("m1", "c1", "bob", "yo", 5);
        let update = chat.handle_event(ConnectionEvent::Server(ServerEvent::ReceiveMessage { message: m.clone() }));
        assert_eq!(update, ChatUpdate::Message(m));

        let typing = ServerEvent::UserTyping { conversation_id: "c1".into(), user_name: "Bob".into() };
        assert_eq!(chat.handle_event(ConnectionEvent::Server(typing.clone())), ChatUpdate::Typing(Some("Bob".into())));
        assert_eq!(chat.handle_event(ConnectionEvent::Server(typing)), ChatUpdate::Nothing);
        let stopped = ServerEvent::UserStoppedTyping { conversation_id: "c1".into(), user_name: "Bob".into() };
        assert_eq!(chat.handle_event(ConnectionEvent::Server(stopped)), ChatUpdate::Typing(None));

        let online = ServerEvent::OnlineUsers { user_ids: vec!["bob".into()] };
        chat.handle_event(ConnectionEvent::Server(online));
        assert_eq!(chat.online_users(), ["bob".to_string()]);

        assert_eq!(chat.handle_event(ConnectionEvent::Closed), ChatUpdate::Disconnected);
    }

    /// Local real-time server that reports every event clients emit. With
    /// `drop_first_after` set, the first connection is closed after that many events.
    async fn live_server(drop_first_after: Option<usize>) -> (Url, mpsc::UnboundedReceiver<ClientEvent>) {
        use futures_util::StreamExt;
        use tokio_tungstenite::tungstenite::Message;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut accepted = 0;
            while let Ok((stream, _)) = listener.accept().await {
                let drop_after = if accepted == 0 { drop_first_after } else { None };
                accepted += 1;
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    let mut count = 0;
                    while let Some(Ok(Message::Text(text))) = ws.next().await {
                        let _ = tx.send(serde_json::from_str::<ClientEvent>(&text).unwrap());
                        count += 1;
                        if Some(count) == drop_after {
                            let _ = ws.close(None).await;
                            break;
                        }
                    }
                });
            }
        });
        (Url::parse(&format!("ws://{}/ws", addr)).unwrap(), rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
        timeout(Duration::from_secs(5), rx.recv()).await.expect("server saw nothing").expect("server gone")
    }

    fn join(id: &str) -> ClientEvent {
        ClientEvent::JoinRoom { conversation_id: id.into() }
    }

    fn typing(id: &str) -> ClientEvent {
        ClientEvent::Typing { conversation_id: id.into(), user_name: "me-name".into() }
    }

    fn stop_typing(id: &str) -> ClientEvent {
        ClientEvent::StopTyping { conversation_id: id.into(), user_name: "me-name".into() }
    }

    #[tokio::test]
    async fn open_joins_room_and_switching_leaves_previous_one() {
        let (url, mut seen) = live_server(None).await;
        let api = Arc::new(MockApi::new());
        api.messages.lock().unwrap().insert("c1".into(), vec![message("h1", "c1", "bob", "hi", 1)]);
        let mut chat = ChatService::new(api, url, Duration::from_millis(1000));

        chat.open_conversation(&session(), conversation()).await.unwrap();
        assert_eq!(chat.view().phase(), &ViewPhase::Live);
        assert_eq!(chat.view().messages().len(), 1);
        assert_eq!(next_event(&mut seen).await, ClientEvent::AddUser { user_id: "me".into() });
        assert_eq!(next_event(&mut seen).await, join("c1"));

        let other = Conversation { id: "c2".into(), members: ["me".into(), "eve".into()], created_at: Utc::now() };
        chat.open_conversation(&session(), other).await.unwrap();
        assert_eq!(next_event(&mut seen).await, ClientEvent::LeaveRoom { conversation_id: "c1".into() });
        assert_eq!(next_event(&mut seen).await, join("c2"));
        // same session, same connection: no second presence announcement
        assert!(timeout(Duration::from_millis(200), seen.recv()).await.is_err());
    }

    #[tokio::test]
    async fn typing_stops_after_idle_window_or_on_send() {
        let (url, mut seen) = live_server(None).await;
        let api = Arc::new(MockApi::new());
        let mut chat = ChatService::new(api, url, Duration::from_millis(100));
        let me = session();
        chat.open_conversation(&me, conversation()).await.unwrap();
        let _ = next_event(&mut seen).await;
        let _ = next_event(&mut seen).await;

        chat.on_input(&me);
        chat.on_input(&me);
        chat.tick(&me);
        assert_eq!(next_event(&mut seen).await, typing("c1"));
        assert_eq!(next_event(&mut seen).await, typing("c1"));

        let deadline = chat.typing_deadline().unwrap();
        tokio::time::sleep_until(deadline).await;
        chat.tick(&me);
        assert_eq!(next_event(&mut seen).await, stop_typing("c1"));
        assert_eq!(chat.typing_deadline(), None);

        chat.on_input(&me);
        assert_eq!(chat.send(&me, "c1", "  hi  "), Ok(true));
        assert_eq!(next_event(&mut seen).await, typing("c1"));
        assert_eq!(
            next_event(&mut seen).await,
            ClientEvent::SendMessage { conversation_id: "c1".into(), sender_id: "me".into(), text: "hi".into() }
        );
        assert_eq!(next_event(&mut seen).await, stop_typing("c1"));
        assert!(timeout(Duration::from_millis(200), seen.recv()).await.is_err());
    }

    #[tokio::test]
    async fn reconnect_after_drop_rejoins_open_room() {
        // the first connection closes after add_user and join_room
        let (url, mut seen) = live_server(Some(2)).await;
        let api = Arc::new(MockApi::new());
        let mut chat = ChatService::new(api, url, Duration::from_millis(1000));
        let mut events = chat.take_events().unwrap();
        let me = session();
        chat.open_conversation(&me, conversation()).await.unwrap();
        assert_eq!(next_event(&mut seen).await, ClientEvent::AddUser { user_id: "me".into() });
        assert_eq!(next_event(&mut seen).await, join("c1"));

        let closed = timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        assert_eq!(chat.handle_event(closed), ChatUpdate::Disconnected);
        assert!(!chat.is_connected());

        chat.connect(&me).await.unwrap();
        assert!(chat.is_connected());
        assert_eq!(next_event(&mut seen).await, ClientEvent::AddUser { user_id: "me".into() });
        assert_eq!(next_event(&mut seen).await, join("c1"));

        assert_eq!(chat.send(&me, "c1", "back"), Ok(true));
        assert_eq!(
            next_event(&mut seen).await,
            ClientEvent::SendMessage { conversation_id: "c1".into(), sender_id: "me".into(), text: "back".into() }
        );
    }

    #[tokio::test]
    async fn mark_read_updates_visible_message() {
        let api = Arc::new(MockApi::new());
        api.messages.lock().unwrap().insert("c1".into(), vec![message("h1", "c1", "bob", "hi", 1)]);
        let mut chat = service(api.clone());
        let _ = chat.open_conversation(&session(), conversation()).await;
        assert!(chat.mark_read("h1").await);
        assert!(chat.view().messages()[0].read);
        assert_eq!(api.call_count("mark_message_read"), 1);
    }
}
