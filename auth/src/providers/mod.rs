//! Provider traits for external capabilities.
//!
//! Reducers only ever talk to these traits. Implementations:
//!
//! | Trait | In-memory | Production |
//! |---|---|---|
//! | [`IdentityProvider`] | `memory::InMemoryIdentityProvider` | `stores::postgres::PostgresIdentityProvider` |
//! | [`ProfileRepository`] | `memory::InMemoryProfileRepository` | `stores::postgres::PostgresProfileRepository` |
//! | [`EmailProvider`] | [`ConsoleEmailProvider`] | [`SmtpEmailProvider`] |
//! | [`SessionStore`] | `memory::InMemorySessionStore` | `stores::RedisSessionStore` |
//! | [`RateLimiter`] | `memory::InMemoryRateLimiter` | `stores::RedisRateLimiter` |

pub mod console_email;
pub mod email;
pub mod identity;
pub mod profile;
pub mod rate_limiter;
pub mod session;
pub mod smtp_email;

pub use console_email::ConsoleEmailProvider;
pub use email::EmailProvider;
pub use identity::IdentityProvider;
pub use profile::ProfileRepository;
pub use rate_limiter::RateLimiter;
pub use session::SessionStore;
pub use smtp_email::SmtpEmailProvider;
