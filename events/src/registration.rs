//! Registration flow for one (user, event) pair.
//!
//! ```text
//!                CheckStatus / Register
//! Unregistered ─────────────────────────→ Checking ──→ Registered
//!      ↑                                     │
//!      └── StatusResolved { false }          └──→ Error ──(Register)──→ Checking
//! ```
//!
//! Submitting while `Checking` is ignored. Submitting while `Registered`
//! goes through the claim again, which finds the existing record and writes
//! nothing.

use crate::error::EventsError;
use crate::repository::{EventRepository, RegistrationRepository};
use crate::types::{ClaimOutcome, Registration};
use event_vibe_core::environment::Clock;
use event_vibe_core::{effect::Effect, reducer::Reducer, smallvec, EventId, SmallVec, UserId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Where the flow is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RegistrationState {
    /// Not registered, or not known to be.
    #[default]
    Unregistered,
    /// A status check or a submission is in flight.
    Checking,
    /// Registered.
    Registered,
    /// The last step failed; `Register` may be retried.
    Error(EventsError),
}

impl RegistrationState {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }
}

/// Registration actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationAction {
    /// Look up whether the user is registered.
    CheckStatus {
        /// Who.
        user_id: UserId,
        /// For which event.
        event_id: EventId,
    },
    /// Result of `CheckStatus`.
    StatusResolved {
        /// Whether a registration exists.
        registered: bool,
    },
    /// Register the user.
    Register {
        /// Who.
        user_id: UserId,
        /// For which event.
        event_id: EventId,
    },
    /// A registration exists now.
    RegistrationConfirmed {
        /// The stored record.
        registration: Registration,
        /// `false` when it already existed.
        newly_created: bool,
    },
    /// A lookup or the write failed.
    RegistrationFailed {
        /// Why.
        error: EventsError,
    },
}

impl RegistrationAction {
    /// Whether this action ends a request.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::StatusResolved { .. } | Self::RegistrationConfirmed { .. } | Self::RegistrationFailed { .. }
        )
    }
}

/// Dependencies of [`RegistrationReducer`].
#[derive(Clone)]
pub struct RegistrationEnvironment<E, R>
where
    E: EventRepository + Clone,
    R: RegistrationRepository + Clone,
{
    /// Event lookups.
    pub events: E,
    /// Registration records.
    pub registrations: R,
    /// Registration timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<E, R> RegistrationEnvironment<E, R>
where
    E: EventRepository + Clone,
    R: RegistrationRepository + Clone,
{
    /// Creates a new `RegistrationEnvironment`.
    #[must_use]
    pub fn new(events: E, registrations: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            registrations,
            clock,
        }
    }
}

/// Registration reducer.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationReducer<E, R> {
    _phantom: PhantomData<fn() -> (E, R)>,
}

impl<E, R> RegistrationReducer<E, R> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<E, R> Default for RegistrationReducer<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> RegistrationReducer<E, R>
where
    E: EventRepository + Clone + 'static,
    R: RegistrationRepository + Clone + 'static,
{
    fn claim_effect(
        env: &RegistrationEnvironment<E, R>,
        user_id: UserId,
        event_id: EventId,
    ) -> Effect<RegistrationAction> {
        let events = env.events.clone();
        let registrations = env.registrations.clone();
        let now = env.clock.now();

        Effect::future(async move {
            let event = match events.get_event(event_id).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    return Some(RegistrationAction::RegistrationFailed {
                        error: EventsError::EventNotFound,
                    });
                }
                Err(error) => return Some(RegistrationAction::RegistrationFailed { error }),
            };

            let registration = Registration::new(user_id, &event, now);
            match registrations.claim(&registration).await {
                Ok(ClaimOutcome::Created(registration)) => {
                    tracing::info!(user_id = %user_id, event_id = %event_id, "Registered for event");
                    Some(RegistrationAction::RegistrationConfirmed {
                        registration,
                        newly_created: true,
                    })
                }
                Ok(ClaimOutcome::AlreadyRegistered(registration)) => {
                    Some(RegistrationAction::RegistrationConfirmed {
                        registration,
                        newly_created: false,
                    })
                }
                Err(error) => {
                    tracing::warn!(user_id = %user_id, event_id = %event_id, error = %error, "Registration failed");
                    Some(RegistrationAction::RegistrationFailed { error })
                }
            }
        })
    }
}

impl<E, R> Reducer for RegistrationReducer<E, R>
where
    E: EventRepository + Clone + 'static,
    R: RegistrationRepository + Clone + 'static,
{
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment<E, R>;

    fn reduce(
        &self,
        state: &mut RegistrationState,
        action: RegistrationAction,
        env: &RegistrationEnvironment<E, R>,
    ) -> SmallVec<[Effect<RegistrationAction>; 4]> {
        match action {
            RegistrationAction::CheckStatus { user_id, event_id } => {
                if state.is_checking() {
                    return smallvec![Effect::None];
                }
                *state = RegistrationState::Checking;

                let registrations = env.registrations.clone();
                smallvec![Effect::future(async move {
                    match registrations.is_registered(user_id, event_id).await {
                        Ok(registered) => Some(RegistrationAction::StatusResolved { registered }),
                        Err(error) => Some(RegistrationAction::RegistrationFailed { error }),
                    }
                })]
            }

            RegistrationAction::StatusResolved { registered } => {
                *state = if registered {
                    RegistrationState::Registered
                } else {
                    RegistrationState::Unregistered
                };
                smallvec![Effect::None]
            }

            RegistrationAction::Register { user_id, event_id } => match state {
                RegistrationState::Checking => {
                    tracing::debug!(user_id = %user_id, event_id = %event_id, "Submission already pending");
                    smallvec![Effect::None]
                }
                RegistrationState::Registered => smallvec![Self::claim_effect(env, user_id, event_id)],
                RegistrationState::Unregistered | RegistrationState::Error(_) => {
                    *state = RegistrationState::Checking;
                    smallvec![Self::claim_effect(env, user_id, event_id)]
                }
            },

            RegistrationAction::RegistrationConfirmed { .. } => {
                *state = RegistrationState::Registered;
                smallvec![Effect::None]
            }

            RegistrationAction::RegistrationFailed { error } => {
                *state = RegistrationState::Error(error);
                smallvec![Effect::None]
            }
        }
    }
}
