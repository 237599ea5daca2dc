use crate::common::models::{ChatMessage, Notification};
use serde::{Deserialize, Serialize};

/// Events the client emits on the real-time connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Presence announcement, sent once the connection is open
    AddUser { user_id: String },

    JoinRoom { conversation_id: String },

    LeaveRoom { conversation_id: String },

    SendMessage {
        conversation_id: String,
        sender_id: String,
        text: String,
    },

    Typing { conversation_id: String, user_name: String },

    StopTyping { conversation_id: String, user_name: String },
}

/// Events the real-time server pushes to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage { message: ChatMessage },

    UserTyping { conversation_id: String, user_name: String },

    UserStoppedTyping { conversation_id: String, user_name: String },

    OnlineUsers { user_ids: Vec<String> },

    Notification { notification: Notification },

    Error { message: String },
}

/// Longest chat text, in characters, the client will put on the wire.
pub const MAX_MESSAGE_LENGTH: usize = 2048;
