//! In-memory provider implementations.
//!
//! Backs the single-process `memory` storage mode and the test suites.
//! State is shared between clones.

mod identity;
mod profile;
mod rate_limiter;
mod session;

pub use identity::InMemoryIdentityProvider;
pub use profile::InMemoryProfileRepository;
pub use rate_limiter::InMemoryRateLimiter;
pub use session::InMemorySessionStore;

use crate::error::AuthError;

fn lock_poisoned<T>(_: T) -> AuthError {
    AuthError::InternalError("Mutex lock failed".into())
}
