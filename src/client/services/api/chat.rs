//! Conversation and message persistence endpoints.

use super::client::ApiClient;
use crate::common::error::ApiError;
use crate::common::models::{ChatMessage, Conversation};

pub async fn list_conversations(client: &ApiClient, user_id: &str) -> Result<Vec<Conversation>, ApiError> {
    let req = client.get(&format!("api/conversations/user/{}", user_id))?;
    client.send_json(req, "list conversations").await
}

/// Returns the existing conversation between the two users, or creates it on first contact.
pub async fn create_conversation(client: &ApiClient, sender_id: &str, receiver_id: &str) -> Result<Conversation, ApiError> {
    let body = serde_json::json!({ "sender_id": sender_id, "receiver_id": receiver_id });
    let req = client.post("api/conversations")?.json(&body);
    client.send_json(req, "create conversation").await
}

/// Persisted message log of a conversation.
pub async fn get_messages(client: &ApiClient, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
    let req = client.get(&format!("api/messages/{}", conversation_id))?;
    client.send_json(req, "get messages").await
}

pub async fn create_message(
    client: &ApiClient,
    conversation_id: &str,
    sender_id: &str,
    text: &str,
) -> Result<ChatMessage, ApiError> {
    let body = serde_json::json!({
        "conversation_id": conversation_id,
        "sender_id": sender_id,
        "text": text,
    });
    let req = client.post("api/messages")?.json(&body);
    client.send_json(req, "create message").await
}

pub async fn mark_message_read(client: &ApiClient, message_id: &str) -> Result<(), ApiError> {
    let req = client.patch(&format!("api/messages/{}/read", message_id))?;
    client.send_empty(req, "mark message read").await
}
