//! Failure-injecting repositories for tests.

use crate::error::{EventsError, Result};
use crate::memory::InMemoryRegistrationRepository;
use crate::repository::RegistrationRepository;
use crate::types::{ClaimOutcome, Registration};
use event_vibe_core::{EventId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory registrations that can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockRegistrationRepository {
    inner: InMemoryRegistrationRepository,
    failing: Arc<AtomicBool>,
}

impl MockRegistrationRepository {
    /// Working repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail with a store error (or work again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The wrapped repository.
    #[must_use]
    pub const fn inner(&self) -> &InMemoryRegistrationRepository {
        &self.inner
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

impl RegistrationRepository for MockRegistrationRepository {
    async fn is_registered(&self, user_id: UserId, event_id: EventId) -> Result<bool> {
        if self.is_failing() {
            return Err(EventsError::LoadFailed("mock store offline".into()));
        }
        self.inner.is_registered(user_id, event_id).await
    }

    async fn claim(&self, registration: &Registration) -> Result<ClaimOutcome> {
        if self.is_failing() {
            return Err(EventsError::SaveFailed("mock store offline".into()));
        }
        self.inner.claim(registration).await
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Registration>> {
        if self.is_failing() {
            return Err(EventsError::LoadFailed("mock store offline".into()));
        }
        self.inner.list_for_user(user_id).await
    }
}
