//! Server-side sessions.
//!
//! A [`SessionData`] is loaded per request by the session middleware and
//! handed to views behind a [`Session`] handle. Only the session key travels
//! in the cookie.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Alphanumeric, DistString};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use taxi_core::TaxiError;

/// Length of generated session keys.
pub const SESSION_KEY_LENGTH: usize = 32;

/// Data associated with one session.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// The key stored in the session cookie.
    pub session_key: String,
    /// Arbitrary JSON values.
    pub data: HashMap<String, serde_json::Value>,
    /// When the session stops being valid.
    pub expire_date: DateTime<Utc>,
    /// Whether the data changed since it was loaded.
    pub modified: bool,
}

impl SessionData {
    /// Creates an empty session with the default two-week lifetime.
    pub fn new(session_key: String) -> Self {
        Self::with_lifetime(session_key, 1_209_600)
    }

    /// Creates an empty session expiring `lifetime_seconds` from now.
    pub fn with_lifetime(session_key: String, lifetime_seconds: i64) -> Self {
        Self {
            session_key,
            data: HashMap::new(),
            expire_date: Utc::now() + Duration::seconds(lifetime_seconds),
            modified: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Sets a value and marks the session modified.
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.data.insert(key.to_string(), value);
        self.modified = true;
    }

    /// Removes a value, marking the session modified if it was present.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        let result = self.data.remove(key);
        if result.is_some() {
            self.modified = true;
        }
        result
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expire_date
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.modified = true;
    }

    /// Gives the session a fresh key, keeping its data.
    pub fn cycle_key(&mut self) {
        self.session_key = generate_session_key();
        self.modified = true;
    }

    /// Clears all data and gives the session a fresh key.
    pub fn flush(&mut self) {
        self.clear();
        self.cycle_key();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Storage for session data.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Loads a live session. Missing and expired sessions are `NotFound`.
    async fn load(&self, session_key: &str) -> Result<SessionData, TaxiError>;

    /// Saves session data and returns its key.
    async fn save(&self, session: &SessionData) -> Result<String, TaxiError>;

    async fn delete(&self, session_key: &str) -> Result<(), TaxiError>;

    async fn exists(&self, session_key: &str) -> Result<bool, TaxiError>;

    /// Drops every expired session.
    async fn clear_expired(&self) -> Result<(), TaxiError>;
}

/// Sessions kept in process memory. They do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemorySessionBackend {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl InMemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionBackend for InMemorySessionBackend {
    async fn load(&self, session_key: &str) -> Result<SessionData, TaxiError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_key)
            .filter(|s| !s.is_expired())
            .cloned()
            .map(|mut s| {
                s.modified = false;
                s
            })
            .ok_or_else(|| TaxiError::NotFound(format!("Session '{session_key}' not found")))
    }

    async fn save(&self, session: &SessionData) -> Result<String, TaxiError> {
        let key = session.session_key.clone();
        self.sessions
            .write()
            .await
            .insert(key.clone(), session.clone());
        Ok(key)
    }

    async fn delete(&self, session_key: &str) -> Result<(), TaxiError> {
        self.sessions.write().await.remove(session_key);
        Ok(())
    }

    async fn exists(&self, session_key: &str) -> Result<bool, TaxiError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_key).is_some_and(|s| !s.is_expired()))
    }

    async fn clear_expired(&self) -> Result<(), TaxiError> {
        self.sessions
            .write()
            .await
            .retain(|_, session| !session.is_expired());
        Ok(())
    }
}

/// The current request's session, shared between the middleware and the view.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionData>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    /// Locks the session for direct reads and writes.
    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.inner.lock().await
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: serde_json::Value) {
        self.inner.lock().await.set(key, value);
    }

    /// Returns a copy of the current data.
    pub async fn snapshot(&self) -> SessionData {
        self.inner.lock().await.clone()
    }
}

/// Generates a random lowercase alphanumeric session key.
pub fn generate_session_key() -> String {
    Alphanumeric
        .sample_string(&mut rand::thread_rng(), SESSION_KEY_LENGTH)
        .to_ascii_lowercase()
}

/// Builds the `Set-Cookie` value carrying a session key.
pub fn build_set_cookie(cookie_name: &str, session_key: &str, max_age: u64) -> String {
    format!("{cookie_name}={session_key}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax")
}

/// Builds a `Set-Cookie` value that removes the session cookie.
pub fn build_delete_cookie(cookie_name: &str) -> String {
    format!(
        "{cookie_name}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; HttpOnly; SameSite=Lax"
    )
}

/// Reads one cookie from a `Cookie` header value.
pub fn read_cookie<'a>(header: &'a str, cookie_name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == cookie_name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_data_set_marks_modified() {
        let mut s = SessionData::new("k".to_string());
        assert!(!s.modified);
        s.set("num_visits", serde_json::json!(1));
        assert!(s.modified);
        assert_eq!(s.get("num_visits"), Some(&serde_json::json!(1)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_remove_missing_does_not_modify() {
        let mut s = SessionData::new("k".to_string());
        assert!(s.remove("nothing").is_none());
        assert!(!s.modified);
    }

    #[test]
    fn test_flush_clears_and_changes_key() {
        let mut s = SessionData::new("k".to_string());
        s.set("a", serde_json::json!("b"));
        s.flush();
        assert!(s.is_empty());
        assert_ne!(s.session_key, "k");
        assert_eq!(s.session_key.len(), SESSION_KEY_LENGTH);
    }

    #[test]
    fn test_expired() {
        let s = SessionData::with_lifetime("k".to_string(), -1);
        assert!(s.is_expired());
    }

    #[test]
    fn test_generate_session_key() {
        let a = generate_session_key();
        let b = generate_session_key();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let backend = InMemorySessionBackend::new();
        let mut s = SessionData::new("abc".to_string());
        s.set("x", serde_json::json!(1));
        backend.save(&s).await.unwrap();

        let loaded = backend.load("abc").await.unwrap();
        assert_eq!(loaded.get("x"), Some(&serde_json::json!(1)));
        assert!(!loaded.modified);
        assert!(backend.exists("abc").await.unwrap());

        backend.delete("abc").await.unwrap();
        assert!(backend.load("abc").await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_expired_is_not_found() {
        let backend = InMemorySessionBackend::new();
        backend
            .save(&SessionData::with_lifetime("old".to_string(), -10))
            .await
            .unwrap();
        assert!(matches!(
            backend.load("old").await,
            Err(TaxiError::NotFound(_))
        ));
        assert!(!backend.exists("old").await.unwrap());
        backend.clear_expired().await.unwrap();
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_session_handle_shares_state() {
        let session = Session::new(SessionData::new("k".to_string()));
        let other = session.clone();
        other.set("a", serde_json::json!(2)).await;
        assert_eq!(session.get("a").await, Some(serde_json::json!(2)));
        assert!(session.snapshot().await.modified);
    }

    #[test]
    fn test_cookie_helpers() {
        assert_eq!(
            build_set_cookie("sessionid", "abc", 60),
            "sessionid=abc; Max-Age=60; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(build_delete_cookie("sessionid").starts_with("sessionid=; Max-Age=0"));
        assert_eq!(read_cookie("a=1; sessionid=xyz", "sessionid"), Some("xyz"));
        assert_eq!(read_cookie("a=1", "sessionid"), None);
    }
}
