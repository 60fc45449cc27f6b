//! Session store trait.

use crate::error::Result;
use crate::state::{Session, SessionId};
use chrono::Duration;
use std::future::Future;

/// Session store.
///
/// Sessions are ephemeral and expire after their TTL.
pub trait SessionStore: Send + Sync {
    /// Create session.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the id already exists.
    fn create_session(&self, session: &Session, ttl: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Get session.
    ///
    /// # Errors
    ///
    /// - Session not found → `AuthError::SessionNotFound`
    /// - Session expired → `AuthError::SessionExpired`
    fn get_session(&self, session_id: SessionId) -> impl Future<Output = Result<Session>> + Send;

    /// Delete session. Deleting a missing session is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn delete_session(&self, session_id: SessionId) -> impl Future<Output = Result<()>> + Send;
}
