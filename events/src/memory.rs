//! In-memory repositories.
//!
//! Back the `memory` storage mode and the tests. Clones share state.

use crate::error::{EventsError, Result};
use crate::repository::{EventRepository, RegistrationRepository};
use crate::types::{ClaimOutcome, Event, Registration};
use event_vibe_core::{EventId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn lock_poisoned<T>(_: T) -> EventsError {
    EventsError::InternalError("Mutex lock failed".into())
}

/// In-memory event store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
}

impl InMemoryEventRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by<K: Ord>(&self, key: impl Fn(&Event) -> K) -> Result<Vec<Event>> {
        let events = self.events.lock().map_err(lock_poisoned)?;
        let mut list: Vec<Event> = events.values().cloned().collect();
        list.sort_by_key(key);
        Ok(list)
    }
}

impl EventRepository for InMemoryEventRepository {
    async fn create_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.lock().map_err(lock_poisoned)?;
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let events = self.events.lock().map_err(lock_poisoned)?;
        Ok(events.get(&id).cloned())
    }

    async fn list_upcoming(&self) -> Result<Vec<Event>> {
        self.sorted_by(|event| (event.start_time, event.created_at))
    }

    async fn list_recent(&self) -> Result<Vec<Event>> {
        self.sorted_by(|event| std::cmp::Reverse(event.created_at))
    }
}

#[derive(Debug, Default)]
struct RegistrationTables {
    /// `users/{uid}/registrations`
    by_user: HashMap<UserId, Vec<Registration>>,
    /// `registrations`
    global: Vec<Registration>,
}

/// In-memory registration store.
///
/// One lock covers both copies, so a claim is a single atomic step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationRepository {
    tables: Arc<Mutex<RegistrationTables>>,
}

impl InMemoryRegistrationRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Global-copy records for one event.
    #[must_use]
    pub fn registrations_for_event(&self, event_id: EventId) -> Vec<Registration> {
        self.tables
            .lock()
            .map(|tables| {
                tables
                    .global
                    .iter()
                    .filter(|r| r.event_id == event_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn is_registered(&self, user_id: UserId, event_id: EventId) -> Result<bool> {
        let tables = self.tables.lock().map_err(lock_poisoned)?;
        Ok(tables
            .by_user
            .get(&user_id)
            .is_some_and(|list| list.iter().any(|r| r.event_id == event_id)))
    }

    async fn claim(&self, registration: &Registration) -> Result<ClaimOutcome> {
        let mut tables = self.tables.lock().map_err(lock_poisoned)?;

        let existing = tables
            .by_user
            .get(&registration.user_id)
            .and_then(|list| list.iter().find(|r| r.event_id == registration.event_id))
            .cloned();
        if let Some(existing) = existing {
            return Ok(ClaimOutcome::AlreadyRegistered(existing));
        }

        tables
            .by_user
            .entry(registration.user_id)
            .or_default()
            .push(registration.clone());
        tables.global.push(registration.clone());
        Ok(ClaimOutcome::Created(registration.clone()))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Registration>> {
        let tables = self.tables.lock().map_err(lock_poisoned)?;
        let mut list = tables.by_user.get(&user_id).cloned().unwrap_or_default();
        list.sort_by_key(|r| std::cmp::Reverse(r.registered_at));
        Ok(list)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::{EventCategory, Registration};
    use chrono::{Duration, TimeZone, Utc};

    fn event(name: &str, start_day: u32, created_minute: u32) -> Event {
        Event {
            id: EventId::new(),
            name: name.into(),
            category: EventCategory::Seminar,
            start_time: Utc.with_ymd_and_hms(2025, 6, start_day, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, start_day, 17, 0, 0).unwrap(),
            location: "Berlin".into(),
            description: "A day of talks".into(),
            created_by: UserId::new(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, created_minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_listing_orders() {
        let repo = InMemoryEventRepository::new();
        let late_created_early_start = event("B", 1, 30);
        let early_created_late_start = event("A", 20, 10);
        repo.create_event(&late_created_early_start).await.unwrap();
        repo.create_event(&early_created_late_start).await.unwrap();

        let upcoming: Vec<_> = repo.list_upcoming().await.unwrap().into_iter().map(|e| e.name).collect();
        let recent: Vec<_> = repo.list_recent().await.unwrap().into_iter().map(|e| e.name).collect();

        assert_eq!(upcoming, ["B", "A"]);
        assert_eq!(recent, ["B", "A"]);
        assert_eq!(
            repo.get_event(early_created_late_start.id).await.unwrap(),
            Some(early_created_late_start)
        );
        assert_eq!(repo.get_event(EventId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_claim_writes_both_copies_once() {
        let repo = InMemoryRegistrationRepository::new();
        let user = UserId::new();
        let first = event("Talks", 3, 0);
        let registration = Registration::new(user, &first, Utc::now());

        let created = repo.claim(&registration).await.unwrap();
        let again = repo
            .claim(&Registration {
                registered_at: registration.registered_at + Duration::minutes(5),
                ..registration.clone()
            })
            .await
            .unwrap();

        assert_eq!(created, ClaimOutcome::Created(registration.clone()));
        assert_eq!(again, ClaimOutcome::AlreadyRegistered(registration.clone()));
        assert!(repo.is_registered(user, first.id).await.unwrap());
        assert!(!repo.is_registered(UserId::new(), first.id).await.unwrap());
        assert_eq!(repo.registrations_for_event(first.id).len(), 1);
        assert_eq!(repo.list_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_user_is_newest_first() {
        let repo = InMemoryRegistrationRepository::new();
        let user = UserId::new();
        let older = Registration::new(user, &event("Old", 2, 0), Utc::now() - Duration::days(1));
        let newer = Registration::new(user, &event("New", 4, 0), Utc::now());
        repo.claim(&older).await.unwrap();
        repo.claim(&newer).await.unwrap();

        let names: Vec<_> = repo
            .list_for_user(user)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event_name)
            .collect();
        assert_eq!(names, ["New", "Old"]);
    }
}
