//! # Event Vibe HTTP API
//!
//! Axum server for organizer and participant accounts, events,
//! registrations and group recommendations.
//!
//! # Request Flow
//!
//! 1. The correlation id layer tags the request and opens its span
//! 2. Extractors resolve the bearer session and re-read the profile role
//! 3. The handler builds an action and runs it through a fresh `Store`
//! 4. The terminal action becomes a JSON response or an [`AppError`]
//!
//! Storage is chosen at startup through a [`Backend`]; handlers are generic
//! over it.
//!
//! ```ignore
//! let state = AppState::in_memory_system_clock(email, auth_config, recommender);
//! let app = build_router::<InMemoryBackend>(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod navigation;
pub mod routes;
pub mod state;

pub use backend::{AnyEmailProvider, AnyRateLimiter, AnySessionStore, Backend, InMemoryBackend};
#[cfg(feature = "postgres")]
pub use backend::PostgresBackend;
pub use config::{Config, ConfigError, StorageBackend};
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId, OptionalSessionUser, RequireOrganizer, SessionUser};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use routes::build_router;
pub use state::AppState;

