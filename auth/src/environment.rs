//! Authentication environment.
//!
//! This module defines the environment type for dependency injection
//! in the auth reducer.

use crate::providers::{EmailProvider, IdentityProvider, ProfileRepository, RateLimiter, SessionStore};
use event_vibe_core::environment::Clock;
use std::sync::Arc;

/// Authentication environment.
///
/// Contains all external dependencies needed by [`crate::AuthReducer`].
///
/// # Type Parameters
///
/// - `I`: Identity provider
/// - `P`: Profile repository
/// - `E`: Email provider
/// - `S`: Session store
/// - `RL`: Rate limiter
#[derive(Clone)]
pub struct AuthEnvironment<I, P, E, S, RL>
where
    I: IdentityProvider + Clone,
    P: ProfileRepository + Clone,
    E: EmailProvider + Clone,
    S: SessionStore + Clone,
    RL: RateLimiter + Clone,
{
    /// Accounts and verification codes.
    pub identity: I,

    /// Profile documents (`users` collection).
    pub profiles: P,

    /// Email provider.
    pub email: E,

    /// Session store (`Redis` in production).
    pub sessions: S,

    /// Rate limiter for verification resends.
    pub rate_limiter: RL,

    /// Clock for session timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<I, P, E, S, RL> AuthEnvironment<I, P, E, S, RL>
where
    I: IdentityProvider + Clone,
    P: ProfileRepository + Clone,
    E: EmailProvider + Clone,
    S: SessionStore + Clone,
    RL: RateLimiter + Clone,
{
    /// Creates a new `AuthEnvironment`.
    #[must_use]
    pub fn new(
        identity: I,
        profiles: P,
        email: E,
        sessions: S,
        rate_limiter: RL,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            profiles,
            email,
            sessions,
            rate_limiter,
            clock,
        }
    }
}
