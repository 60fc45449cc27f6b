//! Redis-based session store implementation.
//!
//! Sessions are stored under `session:{session_id}` as bincode with a TTL
//! matching the session lifetime.
//!
//! # Example
//!
//! ```no_run
//! use event_vibe_auth::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::{Session, SessionId};
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis-based session store with TTL-based expiration.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unavailable`] if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::Unavailable(format!("Failed to create Redis client: {e}")))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::Unavailable(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    fn session_key(session_id: &SessionId) -> String {
        format!("session:{}", session_id.0)
    }
}

impl SessionStore for RedisSessionStore {
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let key = Self::session_key(&session.session_id);
        let bytes =
            bincode::serialize(session).map_err(|e| AuthError::SerializationError(e.to_string()))?;

        #[allow(clippy::cast_sign_loss)] // Clamped to at least one second
        let ttl_seconds = ttl.num_seconds().max(1) as u64;

        // NX: never overwrite an existing session id.
        let created: bool = redis::cmd("SET")
            .arg(&key)
            .arg(bytes)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| AuthError::Unavailable(format!("Failed to create session: {e}")))?
            .is_some();

        if !created {
            return Err(AuthError::InternalError("Session ID already exists".into()));
        }

        tracing::info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            ttl_seconds,
            "Created session in Redis"
        );
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let mut conn = self.conn_manager.clone();
        let bytes: Option<Vec<u8>> = conn
            .get(Self::session_key(&session_id))
            .await
            .map_err(|e| AuthError::Unavailable(format!("Failed to get session from Redis: {e}")))?;

        let bytes = bytes.ok_or(AuthError::SessionNotFound)?;
        let session: Session =
            bincode::deserialize(&bytes).map_err(|e| AuthError::SerializationError(e.to_string()))?;

        // TTL normally removes these first; clock skew can leave a window.
        if session.is_expired(chrono::Utc::now()) {
            return Err(AuthError::SessionExpired);
        }
        Ok(session)
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: u64 = conn
            .del(Self::session_key(&session_id))
            .await
            .map_err(|e| AuthError::Unavailable(format!("Failed to delete session: {e}")))?;
        Ok(())
    }
}
