use crate::common::error::SessionStoreError;
use crate::common::models::Session;
use keyring::Entry;
use log::{info, warn};
use std::path::{Path, PathBuf};

const SERVICE: &str = "jobconnect_client";
const USER: &str = "jobconnect_session";

/// Where the serialized session lives between runs.
#[derive(Debug, Clone)]
pub enum SessionStore {
    /// OS keyring, optionally falling back to a file when the keyring is unavailable.
    Keyring { fallback: Option<PathBuf> },
    /// Plain file only (headless hosts, tests).
    File(PathBuf),
}

impl SessionStore {
    pub fn keyring(fallback_file: Option<PathBuf>) -> Self {
        SessionStore::Keyring { fallback: fallback_file }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        SessionStore::File(path.into())
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(session)?;
        match self {
            SessionStore::File(path) => write_file(path, &json),
            SessionStore::Keyring { fallback } => {
                let entry = Entry::new(SERVICE, USER);
                match entry.set_password(&json) {
                    Ok(()) => Ok(()),
                    Err(e) => match fallback {
                        Some(path) => {
                            write_file(path, &json)?;
                            // never log the token itself
                            info!("[SESSION_STORE] Keyring unavailable, persisted session to fallback file");
                            Ok(())
                        }
                        None => Err(SessionStoreError::Keyring(format!(
                            "keyring unavailable and file fallback disabled: {}",
                            e
                        ))),
                    },
                }
            }
        }
    }

    /// Returns `None` when nothing is stored or the stored value is unreadable.
    pub fn load(&self) -> Option<Session> {
        let raw = match self {
            SessionStore::File(path) => read_file(path),
            SessionStore::Keyring { fallback } => {
                let entry = Entry::new(SERVICE, USER);
                match entry.get_password() {
                    Ok(t) if !t.trim().is_empty() => Some(t),
                    _ => fallback.as_deref().and_then(read_file),
                }
            }
        }?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("[SESSION_STORE] Discarding unreadable persisted session: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match self {
            SessionStore::File(path) => remove_file(path),
            SessionStore::Keyring { fallback } => {
                let entry = Entry::new(SERVICE, USER);
                let _ = entry.delete_password();
                match fallback {
                    Some(path) => remove_file(path),
                    None => Ok(()),
                }
            }
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SessionStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn read_file(path: &Path) -> Option<String> {
    let s = std::fs::read_to_string(path).ok()?;
    let t = s.trim().to_string();
    if t.is_empty() { None } else { Some(t) }
}

fn remove_file(path: &Path) -> Result<(), SessionStoreError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
