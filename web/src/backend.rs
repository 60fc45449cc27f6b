//! Storage backends.
//!
//! A [`Backend`] names the concrete provider types the server runs with.
//! Handlers are generic over it, so the same router serves the in-memory
//! mode and the Postgres mode without dynamic dispatch.
//!
//! Email delivery, sessions and rate limits are chosen independently of the
//! storage backend (console or SMTP, memory or Redis), so they go through
//! the small `Any*` wrappers below.

use chrono::Duration;
use event_vibe_auth::memory::{
    InMemoryIdentityProvider, InMemoryProfileRepository, InMemoryRateLimiter, InMemorySessionStore,
};
use event_vibe_auth::providers::{
    ConsoleEmailProvider, EmailProvider, IdentityProvider, ProfileRepository, RateLimiter,
    SessionStore, SmtpEmailProvider,
};
use event_vibe_auth::stores::{RedisRateLimiter, RedisSessionStore};
use event_vibe_auth::{Result, Session, SessionId};
use event_vibe_events::{
    EventRepository, InMemoryEventRepository, InMemoryRegistrationRepository, RegistrationRepository,
};
use std::marker::PhantomData;

/// The provider types a server instance is built from.
pub trait Backend: Send + Sync + 'static {
    /// Name logged at startup.
    const NAME: &'static str;

    /// Accounts and verification codes.
    type Identity: IdentityProvider + Clone + 'static;
    /// Profile documents.
    type Profiles: ProfileRepository + Clone + 'static;
    /// Verification mail.
    type Email: EmailProvider + Clone + 'static;
    /// Sessions.
    type Sessions: SessionStore + Clone + 'static;
    /// Resend throttling.
    type RateLimiter: RateLimiter + Clone + 'static;
    /// Published events.
    type Events: EventRepository + Clone + 'static;
    /// Registrations.
    type Registrations: RegistrationRepository + Clone + 'static;
}

/// Everything in process memory. Data is lost on restart.
///
/// The email provider is a parameter so tests can capture verification
/// links.
pub struct InMemoryBackend<E = AnyEmailProvider>(PhantomData<fn() -> E>);

impl<E> Backend for InMemoryBackend<E>
where
    E: EmailProvider + Clone + 'static,
{
    const NAME: &'static str = "memory";

    type Identity = InMemoryIdentityProvider;
    type Profiles = InMemoryProfileRepository;
    type Email = E;
    type Sessions = AnySessionStore;
    type RateLimiter = AnyRateLimiter;
    type Events = InMemoryEventRepository;
    type Registrations = InMemoryRegistrationRepository;
}

/// Accounts, profiles, events and registrations in PostgreSQL.
#[cfg(feature = "postgres")]
pub struct PostgresBackend;

#[cfg(feature = "postgres")]
impl Backend for PostgresBackend {
    const NAME: &'static str = "postgres";

    type Identity = event_vibe_auth::stores::postgres::PostgresIdentityProvider;
    type Profiles = event_vibe_auth::stores::postgres::PostgresProfileRepository;
    type Email = AnyEmailProvider;
    type Sessions = AnySessionStore;
    type RateLimiter = AnyRateLimiter;
    type Events = event_vibe_events::postgres::PostgresEventRepository;
    type Registrations = event_vibe_events::postgres::PostgresRegistrationRepository;
}

/// Console or SMTP email.
#[derive(Clone)]
pub enum AnyEmailProvider {
    /// Prints links to stdout.
    Console(ConsoleEmailProvider),
    /// Sends real mail.
    Smtp(SmtpEmailProvider),
}

impl EmailProvider for AnyEmailProvider {
    async fn send_verification_email(&self, to: &str, link: &str) -> Result<()> {
        match self {
            Self::Console(provider) => provider.send_verification_email(to, link).await,
            Self::Smtp(provider) => provider.send_verification_email(to, link).await,
        }
    }
}

/// In-memory or Redis sessions.
#[derive(Clone)]
pub enum AnySessionStore {
    /// Process-local.
    Memory(InMemorySessionStore),
    /// Shared between instances.
    Redis(RedisSessionStore),
}

impl SessionStore for AnySessionStore {
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()> {
        match self {
            Self::Memory(store) => store.create_session(session, ttl).await,
            Self::Redis(store) => store.create_session(session, ttl).await,
        }
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        match self {
            Self::Memory(store) => store.get_session(session_id).await,
            Self::Redis(store) => store.get_session(session_id).await,
        }
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        match self {
            Self::Memory(store) => store.delete_session(session_id).await,
            Self::Redis(store) => store.delete_session(session_id).await,
        }
    }
}

/// In-memory or Redis rate limits.
#[derive(Clone)]
pub enum AnyRateLimiter {
    /// Process-local.
    Memory(InMemoryRateLimiter),
    /// Shared between instances.
    Redis(RedisRateLimiter),
}

impl RateLimiter for AnyRateLimiter {
    async fn check_and_record(&self, key: &str, max_attempts: u32, window: std::time::Duration) -> Result<()> {
        match self {
            Self::Memory(limiter) => limiter.check_and_record(key, max_attempts, window).await,
            Self::Redis(limiter) => limiter.check_and_record(key, max_attempts, window).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use event_vibe_auth::AuthError;
    use event_vibe_core::UserId;

    #[tokio::test]
    async fn test_any_session_store_delegates() {
        let store = AnySessionStore::Memory(InMemorySessionStore::new());
        let now = chrono::Utc::now();
        let session = Session {
            session_id: SessionId::new(),
            user_id: UserId::new(),
            email: "ada@example.com".into(),
            created_at: now,
            expires_at: now + Duration::hours(1),
        };

        store.create_session(&session, Duration::hours(1)).await.unwrap();
        assert_eq!(store.get_session(session.session_id).await.unwrap(), session);
        store.delete_session(session.session_id).await.unwrap();
        assert_eq!(
            store.get_session(session.session_id).await,
            Err(AuthError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_any_rate_limiter_delegates() {
        let limiter = AnyRateLimiter::Memory(InMemoryRateLimiter::new());
        let window = std::time::Duration::from_secs(60);
        limiter.check_and_record("k", 1, window).await.unwrap();
        assert!(matches!(
            limiter.check_and_record("k", 1, window).await,
            Err(AuthError::TooManyAttempts { .. })
        ));
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(<InMemoryBackend as Backend>::NAME, "memory");
    }
}
