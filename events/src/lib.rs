//! # Event Vibe Events
//!
//! Events published by organizers and participant registrations.
//!
//! Registering is a conditional write keyed by (user, event): concurrent
//! submissions for the same pair produce exactly one record, stored both
//! under the user and in the global list.
//!
//! ## Example
//!
//! ```rust,ignore
//! use event_vibe_events::*;
//! use event_vibe_runtime::Store;
//!
//! let store = Store::new(RegistrationState::default(), RegistrationReducer::new(), env);
//! let result = store
//!     .send_and_wait_for(
//!         RegistrationAction::Register { user_id, event_id },
//!         RegistrationAction::is_terminal,
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod memory;
pub mod registration;
pub mod repository;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{EventsError, Result};
pub use memory::{InMemoryEventRepository, InMemoryRegistrationRepository};
pub use registration::{RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationState};
pub use repository::{EventRepository, RegistrationRepository};
pub use types::{parse_event_date, ClaimOutcome, Event, EventCategory, NewEvent, Registration};
