use super::lock_poisoned;
use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::{Session, SessionId};
use chrono::Duration;
use event_vibe_core::environment::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory session store.
///
/// Expired sessions are removed when read, and all of them are purged
/// whenever a new session is created.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore").finish_non_exhaustive()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(SystemClock),
        }
    }

    /// Builder: clock used for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of stored sessions, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or_default()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &Session, _ttl: Duration) -> Result<()> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().map_err(lock_poisoned)?;
        sessions.retain(|_, stored| !stored.is_expired(now));
        if sessions.contains_key(&session.session_id) {
            return Err(AuthError::InternalError("Session ID already exists".into()));
        }
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().map_err(lock_poisoned)?;
        let session = sessions.get(&session_id).ok_or(AuthError::SessionNotFound)?;
        if session.is_expired(now) {
            sessions.remove(&session_id);
            return Err(AuthError::SessionExpired);
        }
        Ok(session.clone())
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let mut sessions = self.sessions.lock().map_err(lock_poisoned)?;
        sessions.remove(&session_id);
        Ok(())
    }
}
