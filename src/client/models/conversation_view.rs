use crate::common::models::{ChatMessage, Conversation};
use log::{debug, warn};

/// Lifecycle of an open chat view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewPhase {
    #[default]
    Closed,
    /// History fetch in flight; live events are held back.
    Loading,
    /// History applied, room joined, events flowing.
    Live,
}

/// Local state of the conversation currently on screen.
#[derive(Debug, Default)]
pub struct ConversationView {
    phase: ViewPhase,
    conversation: Option<Conversation>,
    messages: Vec<ChatMessage>,
    /// Live messages received while loading, in arrival order.
    pending: Vec<ChatMessage>,
    peer_typing: Option<String>,
}

impl ConversationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation.as_ref().map(|c| c.id.as_str())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Name of the peer currently typing, if any.
    pub fn peer_typing(&self) -> Option<&str> {
        self.peer_typing.as_deref()
    }

    pub fn is_open_for(&self, conversation_id: &str) -> bool {
        self.phase != ViewPhase::Closed && self.conversation_id() == Some(conversation_id)
    }

    /// Start showing `conversation`. Anything from a previous conversation is dropped.
    pub fn open(&mut self, conversation: Conversation) {
        self.conversation = Some(conversation);
        self.messages.clear();
        self.pending.clear();
        self.peer_typing = None;
        self.phase = ViewPhase::Loading;
    }

    /// Seed the view with persisted history, then release held-back live messages.
    ///
    /// Returns false and leaves the view untouched when the response belongs to a
    /// conversation that is no longer loading.
    pub fn apply_history(&mut self, conversation_id: &str, history: Vec<ChatMessage>) -> bool {
        if self.phase != ViewPhase::Loading || self.conversation_id() != Some(conversation_id) {
            warn!("[CHAT] Discarding stale history for conversation {}", conversation_id);
            return false;
        }
        self.messages = history;
        self.messages.append(&mut self.pending);
        self.phase = ViewPhase::Live;
        true
    }

    /// Handle an incoming live message. Returns true when it became visible.
    pub fn receive(&mut self, message: ChatMessage) -> bool {
        let Some(conversation) = self.conversation.as_ref() else {
            return false;
        };
        if message.conversation_id != conversation.id {
            debug!("[CHAT] Ignoring message for conversation {}", message.conversation_id);
            return false;
        }
        if !message.is_valid_for(conversation) {
            warn!("[CHAT] Dropping message {} from non-member {}", message.id, message.sender_id);
            return false;
        }
        match self.phase {
            ViewPhase::Closed => false,
            ViewPhase::Loading => {
                self.pending.push(message);
                false
            }
            ViewPhase::Live => {
                self.messages.push(message);
                true
            }
        }
    }

    /// Typing signal from the peer. No timeout clears a flag left set.
    pub fn set_peer_typing(&mut self, conversation_id: &str, user_name: &str, typing: bool) {
        if self.conversation_id() != Some(conversation_id) || self.phase == ViewPhase::Closed {
            return;
        }
        self.peer_typing = if typing { Some(user_name.to_string()) } else { None };
    }

    /// Flip the read flag of a visible message.
    pub fn mark_read(&mut self, message_id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(m) => {
                m.read = true;
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.phase = ViewPhase::Closed;
        self.conversation = None;
        self.messages.clear();
        self.pending.clear();
        self.peer_typing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::services::api::mock::message;
    use chrono::Utc;

    fn conv(id: &str) -> Conversation {
        Conversation { id: id.into(), members: ["me".into(), "bob".into()], created_at: Utc::now() }
    }

    #[test]
    fn history_is_shown_before_live_messages_received_while_loading() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        assert_eq!(view.phase(), &ViewPhase::Loading);

        assert!(!view.receive(message("live", "c1", "bob", "new one", 50)));
        assert!(view.messages().is_empty());

        let history = vec![message("h1", "c1", "me", "hi", 1), message("h2", "c1", "bob", "hey", 2)];
        assert!(view.apply_history("c1", history));
        let ids: Vec<_> = view.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["h1", "h2", "live"]);
        assert_eq!(view.phase(), &ViewPhase::Live);
    }

    #[test]
    fn live_messages_append_without_dedupe() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        view.apply_history("c1", vec![]);
        let m = message("m1", "c1", "bob", "dup", 1);
        assert!(view.receive(m.clone()));
        assert!(view.receive(m));
        assert_eq!(view.messages().len(), 2);
    }

    #[test]
    fn stale_history_is_discarded() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        view.open(conv("c2"));
        assert!(!view.apply_history("c1", vec![message("old", "c1", "bob", "x", 1)]));
        assert_eq!(view.phase(), &ViewPhase::Loading);
        assert!(view.messages().is_empty());
        assert!(view.apply_history("c2", vec![]));
    }

    #[test]
    fn foreign_and_invalid_messages_are_ignored() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        view.apply_history("c1", vec![]);
        assert!(!view.receive(message("x", "c2", "bob", "elsewhere", 1)));
        assert!(!view.receive(message("y", "c1", "mallory", "intruder", 1)));
        assert!(view.messages().is_empty());
    }

    #[test]
    fn typing_flag_toggles_and_stays_until_stopped() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        view.set_peer_typing("c1", "Bob", true);
        assert_eq!(view.peer_typing(), Some("Bob"));
        view.set_peer_typing("c2", "Eve", false);
        assert_eq!(view.peer_typing(), Some("Bob"));
        view.set_peer_typing("c1", "Bob", false);
        assert_eq!(view.peer_typing(), None);
    }

    #[test]
    fn close_resets_everything() {
        let mut view = ConversationView::new();
        view.open(conv("c1"));
        view.apply_history("c1", vec![message("h1", "c1", "bob", "hi", 1)]);
        assert!(view.mark_read("h1"));
        assert!(view.messages()[0].read);
        view.close();
        assert_eq!(view.phase(), &ViewPhase::Closed);
        assert!(view.messages().is_empty());
        assert!(!view.receive(message("z", "c1", "bob", "late", 3)));
    }
}
