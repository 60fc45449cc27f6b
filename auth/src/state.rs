//! Account, profile and session types, plus the per-request flow state.

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use event_vibe_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a user can do. Chosen at sign-up and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes events.
    Organizer,
    /// Browses and registers for events.
    Participant,
}

impl Role {
    /// Landing page after sign-in.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Organizer => "/organizer/dashboard",
            Self::Participant => "/events",
        }
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Participant => "participant",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Participant
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(Self::Organizer),
            "participant" => Ok(Self::Participant),
            other => Err(AuthError::InvalidInput(format!("Unknown role: {other}"))),
        }
    }
}

/// The profile document stored for each user.
///
/// This is the only authoritative source for a user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Same id as the identity account.
    pub uid: UserId,
    /// Sign-up email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Organizer or participant.
    pub role: Role,
    /// Free-text home location.
    pub location: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

/// The identity provider's view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub uid: UserId,
    /// Normalized email.
    pub email: String,
    /// Name given at sign-up.
    pub display_name: String,
    /// Whether the email has been verified.
    pub email_verified: bool,
}

/// Opaque session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AuthError::SessionNotFound)
    }
}

/// A signed-in browser.
///
/// Carries no role: privileged calls re-read the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Token handed to the client.
    pub session_id: SessionId,
    /// Owner.
    pub user_id: UserId,
    /// Owner's email at sign-in.
    pub email: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// How an auth flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Verified user with a fresh session.
    SignedIn {
        /// The new session.
        session: Session,
        /// The user's profile.
        profile: UserProfile,
    },
    /// The account exists but the email is unverified; a verification email
    /// was sent and no session exists.
    PendingVerification {
        /// Address the email went to.
        email: String,
    },
    /// Session removed (or never existed).
    SignedOut,
    /// Email verified; the user must now sign in.
    Verified {
        /// The verified account.
        uid: UserId,
    },
    /// Resend request accepted.
    VerificationResent,
    /// The flow failed.
    Failed(AuthError),
}

/// Per-request auth flow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Email the flow is about, once known.
    pub email: Option<String>,
    /// Set when a terminal action has been reduced.
    pub outcome: Option<AuthOutcome>,
}

impl AuthState {
    /// Whether the flow has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}
