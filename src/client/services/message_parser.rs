// Client-side parsing of real-time frames and formatting of chat lines
use crate::common::error::WebSocketError;
use crate::common::models::ChatMessage;
use crate::common::protocol::ServerEvent;
use chrono::{DateTime, Local, Utc};

/// Parse a text frame from the real-time server.
pub fn parse_server_event(text: &str) -> Result<ServerEvent, WebSocketError> {
    // Read the tag first so unknown event types get a precise error
    let generic: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| WebSocketError::InvalidMessage(format!("Invalid JSON: {}", e)))?;

    let message_type = generic
        .get("message_type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| WebSocketError::InvalidMessage("Missing message_type field".to_string()))?
        .to_string();

    serde_json::from_value::<ServerEvent>(generic).map_err(|e| {
        WebSocketError::InvalidMessage(format!("Failed to parse {}: {}", message_type, e))
    })
}

/// Local wall-clock time as HH:MM.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    let local_dt: DateTime<Local> = ts.with_timezone(&Local);
    local_dt.format("%H:%M").to_string()
}

/// `[HH:MM] sender: text` line for terminal output.
pub fn format_message_line(message: &ChatMessage, sender_label: &str) -> String {
    format!("[{}] {}: {}", format_timestamp(message.created_at), sender_label, message.text)
}
