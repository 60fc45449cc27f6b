//! Registration through the `Store`, including concurrent submissions.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use event_vibe_core::environment::Clock;
use event_vibe_core::{EventId, UserId};
use event_vibe_events::{
    Event, EventRepository, InMemoryEventRepository, InMemoryRegistrationRepository, NewEvent,
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationRepository,
    RegistrationState,
};
use event_vibe_runtime::Store;
use event_vibe_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

type Env = RegistrationEnvironment<InMemoryEventRepository, InMemoryRegistrationRepository>;

const WAIT: Duration = Duration::from_secs(5);

fn env() -> Env {
    RegistrationEnvironment::new(
        InMemoryEventRepository::new(),
        InMemoryRegistrationRepository::new(),
        Arc::new(test_clock()),
    )
}

async fn publish(env: &Env) -> Event {
    let event = NewEvent {
        name: "Cultural Night".into(),
        category: "Cultural Event".into(),
        date: "2025-05-02".into(),
        end_date: None,
        location: "Lisbon".into(),
        description: "Music, food and dancing by the river.".into(),
    }
    .into_event(UserId::new(), test_clock().now())
    .unwrap();
    env.events.create_event(&event).await.unwrap();
    event
}

async fn send(env: &Env, action: RegistrationAction) -> (RegistrationAction, RegistrationState) {
    let store = Store::new(RegistrationState::default(), RegistrationReducer::new(), env.clone());
    let terminal = store
        .send_and_wait_for(action, RegistrationAction::is_terminal, WAIT)
        .await
        .expect("flow should finish");
    let state = store.state(Clone::clone).await;
    (terminal, state)
}

#[tokio::test]
async fn test_check_then_register_then_check() {
    let env = env();
    let event = publish(&env).await;
    let user_id = UserId::new();
    let check = RegistrationAction::CheckStatus {
        user_id,
        event_id: event.id,
    };

    let (before, state) = send(&env, check.clone()).await;
    assert_eq!(before, RegistrationAction::StatusResolved { registered: false });
    assert_eq!(state, RegistrationState::Unregistered);

    let (registered, state) = send(
        &env,
        RegistrationAction::Register {
            user_id,
            event_id: event.id,
        },
    )
    .await;
    assert!(matches!(
        registered,
        RegistrationAction::RegistrationConfirmed { newly_created: true, .. }
    ));
    assert_eq!(state, RegistrationState::Registered);

    let (after, _) = send(&env, check).await;
    assert_eq!(after, RegistrationAction::StatusResolved { registered: true });
}

#[tokio::test]
async fn test_concurrent_submissions_create_exactly_one_record() {
    let env = env();
    let event = publish(&env).await;
    let user_id = UserId::new();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let env = env.clone();
            let event_id = event.id;
            tokio::spawn(async move { send(&env, RegistrationAction::Register { user_id, event_id }).await.0 })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            RegistrationAction::RegistrationConfirmed { newly_created, .. } => {
                created += usize::from(newly_created);
            }
            other => unreachable!("unexpected action: {other:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(env.registrations.registrations_for_event(event.id).len(), 1);
    assert_eq!(env.registrations.list_for_user(user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registering_for_missing_event_fails_without_writing() {
    let env = env();
    let user_id = UserId::new();

    let (terminal, state) = send(
        &env,
        RegistrationAction::Register {
            user_id,
            event_id: EventId::new(),
        },
    )
    .await;

    assert!(matches!(terminal, RegistrationAction::RegistrationFailed { .. }));
    assert!(matches!(state, RegistrationState::Error(_)));
    assert!(env.registrations.list_for_user(user_id).await.unwrap().is_empty());
}
