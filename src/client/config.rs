use std::env;
use std::path::PathBuf;
use std::time::Duration;
use log::{info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST backend base URL, port override already applied.
    pub api_base_url: Url,
    /// Real-time endpoint.
    pub websocket_url: Url,
    pub session_file: PathBuf,
    pub keyring_fallback: bool,
    pub typing_idle: Duration,
    pub http_timeout: Duration,
    pub log_level: String,
}

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base = env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let port = env::var("API_PORT").ok().and_then(|p| p.parse().ok());
        let api_base_url = Self::resolve_base_url(&base, port);
        let websocket_url = match env::var("WEBSOCKET_URL").ok().and_then(|u| Url::parse(&u).ok()) {
            Some(u) => u,
            None => Self::derive_websocket_url(&api_base_url),
        };

        let config = Self {
            api_base_url,
            websocket_url,
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data").join("session.json")),
            keyring_fallback: env::var("KEYRING_FALLBACK").unwrap_or_default() == "true",
            typing_idle: Duration::from_millis(
                env::var("TYPING_IDLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(1000),
            ),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            ),
            log_level: Self::log_level_from_env(),
        };

        info!("Client configuration loaded:");
        info!("  API base URL: {}", config.api_base_url);
        info!("  WebSocket URL: {}", config.websocket_url);
        config
    }

    /// `LOG_LEVEL`, `info` when unset. Readable before the logger exists.
    pub fn log_level_from_env() -> String {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    }

    /// Applies CLI overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<&str>, port: Option<u16>, ws_url: Option<&str>) -> Self {
        if api_url.is_some() || port.is_some() {
            let base = api_url.map(str::to_string).unwrap_or_else(|| self.api_base_url.to_string());
            self.api_base_url = Self::resolve_base_url(&base, port);
            self.websocket_url = Self::derive_websocket_url(&self.api_base_url);
        }
        if let Some(u) = ws_url {
            match Url::parse(u) {
                Ok(u) => self.websocket_url = u,
                Err(e) => warn!("Ignoring invalid --ws-url '{}': {}", u, e),
            }
        }
        self
    }

    fn resolve_base_url(base: &str, port: Option<u16>) -> Url {
        let mut url = match Url::parse(base) {
            Ok(u) => u,
            Err(e) => {
                warn!("Invalid API_BASE_URL '{}' ({}), falling back to {}", base, e, DEFAULT_API_BASE_URL);
                Url::parse(DEFAULT_API_BASE_URL).expect("default URL is valid")
            }
        };
        if let Some(p) = port {
            if url.set_port(Some(p)).is_err() {
                warn!("Cannot apply port override {} to {}", p, url);
            }
        }
        url
    }

    /// `http://host:port` -> `ws://host:port/ws`, `https` -> `wss`.
    pub fn derive_websocket_url(api: &Url) -> Url {
        let mut ws = api.clone();
        let scheme = if api.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always an allowed scheme change for special schemes
        let _ = ws.set_scheme(scheme);
        ws.set_path("/ws");
        ws.set_query(None);
        ws
    }
}
