//! Error types for each client layer.
//!
//! Every screen handles failures on its own terms; these enums only give
//! the failures a name so callers can log them, show them inline, or fall back.

use thiserror::Error;

/// Failure talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401. Detected and logged, never acted on automatically.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebSocketError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("WebSocket not connected")]
    NotConnected,
    #[error("Message send failed: {0}")]
    SendFailed(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Client-side form validation failure, reported per field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Keyring error: {0}")]
    Keyring(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
