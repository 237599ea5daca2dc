//! # API Client
//!
//! HTTP client for the marketplace REST backend.

use crate::common::error::ApiError;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

/// HTTP client for communicating with the backend API server.
///
/// Holds the bearer token of the current session, if any, and attaches it to
/// every request.
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url: with_trailing_slash(base_url), token: RwLock::new(None) }
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Resolves `path` (no leading slash) against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.get(self.url(path)?)))
    }

    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.post(self.url(path)?)))
    }

    pub(crate) fn patch(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.patch(self.url(path)?)))
    }

    pub(crate) fn delete(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.delete(self.url(path)?)))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// Sends the request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = self.send_checked(req, what).await?;
        response.json::<T>().await.map_err(|e| {
            warn!("[API] {}: failed to parse response: {}", what, e);
            ApiError::Decode(e.to_string())
        })
    }

    /// Sends the request, discarding any body on success.
    pub(crate) async fn send_empty(&self, req: RequestBuilder, what: &str) -> Result<(), ApiError> {
        self.send_checked(req, what).await.map(|_| ())
    }

    async fn send_checked(&self, req: RequestBuilder, what: &str) -> Result<reqwest::Response, ApiError> {
        let response = req.send().await.map_err(|e| {
            warn!("[API] {}: network error: {}", what, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("[API] {} -> {}", what, status);
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };

        if status == StatusCode::UNAUTHORIZED {
            // detected only: the session is left as is
            warn!("[API] {}: 401 Unauthorized ({})", what, message);
            return Err(ApiError::Unauthorized(message));
        }

        warn!("[API] {}: status {} ({})", what, status.as_u16(), message);
        Err(ApiError::Status { status: status.as_u16(), message })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_under_base_path() {
        let api = ApiClient::new(Url::parse("http://localhost:5000/backend").unwrap(), Duration::from_secs(1));
        assert_eq!(api.url("/api/jobs/1").unwrap().as_str(), "http://localhost:5000/backend/api/jobs/1");
        assert_eq!(api.url("api/jobs").unwrap().as_str(), "http://localhost:5000/backend/api/jobs");
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let api = ApiClient::new(Url::parse("http://localhost:5000").unwrap(), Duration::from_secs(1));
        assert_eq!(api.token(), None);
        api.set_token(Some("abc".into()));
        assert_eq!(api.token().as_deref(), Some("abc"));
        api.set_token(None);
        assert_eq!(api.token(), None);
    }
}
