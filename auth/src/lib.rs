//! # Event Vibe Auth
//!
//! Organizer and participant accounts for Event Vibe.
//!
//! - Email/password sign-up that always ends signed out, pending email
//!   verification
//! - Sign-in that refuses unverified emails and resends the verification link
//! - Single-use verification codes and a rate-limited resend that never
//!   reveals whether an account exists
//! - Sessions that carry no role; the profile document is the only
//!   authoritative source for it
//!
//! ## Architecture
//!
//! Every flow is a reducer run by a per-request store:
//!
//! ```text
//! SignIn → Authenticated → SignedIn | VerificationRequired | Failed
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use event_vibe_auth::*;
//! use event_vibe_runtime::Store;
//!
//! let store = Store::new(AuthState::default(), AuthReducer::new(config), env);
//! let terminal = store
//!     .send_and_wait_for(
//!         AuthAction::SignIn { email, password },
//!         AuthAction::is_terminal,
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//! ```

pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod memory;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod stores;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::AuthAction;
pub use config::AuthConfig;
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use reducers::AuthReducer;
pub use state::{Account, AuthOutcome, AuthState, Role, Session, SessionId, UserProfile};
