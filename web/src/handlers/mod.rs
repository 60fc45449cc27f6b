//! HTTP request handlers, one module per area.
//!
//! Handlers are generic over the storage [`Backend`](crate::backend::Backend)
//! and get their providers from [`AppState`](crate::state::AppState).

pub mod auth;
pub mod events;
pub mod health;
pub mod profile;
pub mod recommendations;
pub mod registrations;

use crate::error::AppError;
use event_vibe_core::EventId;
use event_vibe_events::EventsError;

/// An event id from the path; anything unparseable is simply not found.
pub(crate) fn parse_event_id(raw: &str) -> Result<EventId, AppError> {
    raw.parse().map_err(|_| EventsError::EventNotFound.into())
}

/// A flow ended in an outcome the handler does not expect.
pub(crate) fn unexpected(outcome: impl std::fmt::Debug) -> AppError {
    tracing::error!(outcome = ?outcome, "Unexpected flow outcome");
    AppError::internal("An unexpected error occurred. Please try again.")
}
