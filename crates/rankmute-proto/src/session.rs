//! Session store — the bearer token obtained from the login callback.
//!
//! The token is persisted as `{"jwt": "<token>"}` in a JSON file and read
//! back on startup.  It is never refreshed; when the backend stops accepting
//! it the user logs in again.  Consumers that need to follow a login that
//! happens while they are alive subscribe to the watch channel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Key the token is stored under in the session file.
pub const SESSION_KEY: &str = "jwt";

/// Credentials for authenticated calls.  Passed explicitly to every
/// `ApiClient` method that needs them.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

pub struct SessionStore {
    path: PathBuf,
    tx: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Open the store at `path`.  A missing or unreadable file yields an
    /// empty session.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = read_token(&path).map(Session::new);
        match &session {
            Some(_) => info!("session restored from {}", path.display()),
            None => debug!("no stored session at {}", path.display()),
        }
        let (tx, _rx) = watch::channel(session);
        Self { path, tx }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current session, if logged in.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver that observes every later `store`.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// Persist `token`, then publish it to subscribers.
    pub fn store(&self, token: impl Into<String>) -> anyhow::Result<()> {
        let session = Session::new(token);
        write_token(&self.path, session.token())?;
        self.tx.send_replace(Some(session));
        info!("session stored at {}", self.path.display());
        Ok(())
    }
}

fn read_token(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("could not read session file {}: {}", path.display(), e);
            return None;
        }
    };
    let map: HashMap<String, String> = match serde_json::from_str(&content) {
        Ok(m) => m,
        Err(e) => {
            warn!("ignoring malformed session file {}: {}", path.display(), e);
            return None;
        }
    };
    map.get(SESSION_KEY).filter(|t| !t.is_empty()).cloned()
}

fn write_token(path: &Path, token: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut map = HashMap::new();
    map.insert(SESSION_KEY, token);
    std::fs::write(path, serde_json::to_string_pretty(&map)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path().join("session.json"));
        assert!(!store.is_logged_in());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_store_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = SessionStore::load(&path);
        store.store("tok-123").unwrap();
        assert_eq!(store.current().unwrap().token(), "tok-123");

        let raw = std::fs::read_to_string(&path).unwrap();
        let map: HashMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.get(SESSION_KEY).map(String::as_str), Some("tok-123"));

        let reloaded = SessionStore::load(&path);
        assert_eq!(reloaded.current(), Some(Session::new("tok-123")));
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(!SessionStore::load(&path).is_logged_in());

        std::fs::write(&path, r#"{"jwt": ""}"#).unwrap();
        assert!(!SessionStore::load(&path).is_logged_in());
    }

    #[test]
    fn test_subscribers_see_new_token() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path().join("session.json"));
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.store("fresh").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(Session::token), Some("fresh"));
    }

    #[test]
    fn test_bearer_header_and_redacted_debug() {
        let session = Session::new("abc");
        assert_eq!(session.bearer(), "Bearer abc");
        assert!(!format!("{:?}", session).contains("abc"));
    }
}
