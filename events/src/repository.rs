//! Storage traits for events and registrations.
//!
//! | Trait | In-memory | Production |
//! |---|---|---|
//! | [`EventRepository`] | `memory::InMemoryEventRepository` | `postgres::PostgresEventRepository` |
//! | [`RegistrationRepository`] | `memory::InMemoryRegistrationRepository` | `postgres::PostgresRegistrationRepository` |

use crate::error::Result;
use crate::types::{ClaimOutcome, Event, Registration};
use event_vibe_core::{EventId, UserId};
use std::future::Future;

/// The `events` collection. Events are never updated or deleted.
pub trait EventRepository: Send + Sync {
    /// Store a new event.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::SaveFailed`] on storage failure.
    fn create_event(&self, event: &Event) -> impl Future<Output = Result<()>> + Send;

    /// Load one event.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::LoadFailed`] on storage failure; a missing
    /// event is `Ok(None)`.
    fn get_event(&self, id: EventId) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Every event, soonest `start_time` first.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::LoadFailed`] on storage failure.
    fn list_upcoming(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Every event, most recently created first.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::LoadFailed`] on storage failure.
    fn list_recent(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

/// Registrations, stored twice: once under the user and once globally.
///
/// Both copies are written together or not at all.
pub trait RegistrationRepository: Send + Sync {
    /// Whether `user_id` is registered for `event_id`.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::LoadFailed`] on storage failure.
    fn is_registered(&self, user_id: UserId, event_id: EventId) -> impl Future<Output = Result<bool>> + Send;

    /// Write the registration unless one exists for the same
    /// (user, event) pair.
    ///
    /// Concurrent claims for one pair produce exactly one
    /// [`ClaimOutcome::Created`].
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::SaveFailed`] on storage failure; nothing is
    /// written in that case.
    fn claim(&self, registration: &Registration) -> impl Future<Output = Result<ClaimOutcome>> + Send;

    /// The user's registrations, newest first.
    ///
    /// # Errors
    ///
    /// [`crate::EventsError::LoadFailed`] on storage failure.
    fn list_for_user(&self, user_id: UserId) -> impl Future<Output = Result<Vec<Registration>>> + Send;
}
