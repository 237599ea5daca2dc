use crate::client::services::api::ApiService;
use crate::common::models::ChatMessage;
use log::{error, info};

/// Fetch the persisted log of a conversation, oldest first.
///
/// Any failure degrades to an empty history; nothing is retried.
pub async fn load_history(api: &dyn ApiService, conversation_id: &str) -> Vec<ChatMessage> {
    match api.get_messages(conversation_id).await {
        Ok(mut messages) => {
            // stable: equal timestamps keep the backend's order
            messages.sort_by_key(|m| m.created_at);
            info!("[HISTORY] Loaded {} messages for {}", messages.len(), conversation_id);
            messages
        }
        Err(e) => {
            error!("[HISTORY] Failed to load messages for {}: {}", conversation_id, e);
            Vec::new()
        }
    }
}
