//! Server-side session store
//!
//! Sessions are opaque hex tokens mapped to user ids with a fixed TTL. The
//! store is injected through AppState; a background task sweeps expired
//! entries on a configurable cadence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use shared::SESSION_TTL_SECS;

use super::tokens::generate_token;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the standard 24h TTL, returning its token.
    pub fn create(&self, user_id: i64) -> String {
        self.create_with_ttl(user_id, Duration::seconds(SESSION_TTL_SECS))
    }

    pub fn create_with_ttl(&self, user_id: i64, ttl: Duration) -> String {
        let token = generate_token();
        let session = Session {
            user_id,
            expires_at: Utc::now() + ttl,
        };
        self.write().insert(token.clone(), session);
        token
    }

    /// Look up a live session; expired entries read as absent even before
    /// the sweeper gets to them.
    pub fn get(&self, token: &str) -> Option<Session> {
        let guard = self.read();
        let session = guard.get(token)?;
        if session.expires_at <= Utc::now() {
            return None;
        }
        Some(session.clone())
    }

    pub fn remove(&self, token: &str) -> Option<Session> {
        self.write().remove(token)
    }

    /// Evict expired sessions, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, session| session.expires_at > now);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
