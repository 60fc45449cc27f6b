//! Authentication actions.
//!
//! Commands come from the HTTP layer, intermediate actions are fed back by
//! effects, and terminal actions end a flow with an [`AuthOutcome`].

use crate::error::AuthError;
use crate::state::{Account, AuthOutcome, Role, Session, SessionId, UserProfile};
use event_vibe_core::UserId;

/// Authentication actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Create an account and its profile, then send a verification email.
    SignUp {
        /// Email as typed.
        email: String,
        /// Plain-text password.
        password: String,
        /// Display name.
        name: String,
        /// Chosen once, never changed.
        role: Role,
        /// Home location.
        location: String,
    },

    /// Sign in with email and password.
    SignIn {
        /// Email as typed.
        email: String,
        /// Plain-text password.
        password: String,
    },

    /// End a session.
    SignOut {
        /// Session to remove.
        session_id: SessionId,
    },

    /// Exchange a verification code (`oobCode`) for a verified email.
    ApplyVerificationCode {
        /// Code from the verification link.
        code: String,
    },

    /// Send a new verification email if the account needs one.
    ResendVerification {
        /// Email as typed.
        email: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Effect results
    // ═══════════════════════════════════════════════════════════════════════
    /// The identity account exists; the profile is next.
    AccountCreated {
        /// New, unverified account.
        account: Account,
        /// Requested role.
        role: Role,
        /// Requested location.
        location: String,
    },

    /// The profile document was written; the verification email is next.
    ProfileCreated {
        /// Stored profile.
        profile: UserProfile,
    },

    /// Credentials checked out.
    Authenticated {
        /// The authenticated account, verified or not.
        account: Account,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Terminal actions
    // ═══════════════════════════════════════════════════════════════════════
    /// Sign-up finished; the user must verify before signing in.
    SignUpCompleted {
        /// The new profile.
        profile: UserProfile,
    },

    /// Sign-in refused because the email is unverified. A fresh
    /// verification email was sent.
    VerificationRequired {
        /// Address the email went to.
        email: String,
    },

    /// Session created.
    SignedIn {
        /// New session.
        session: Session,
        /// Profile with the authoritative role.
        profile: UserProfile,
    },

    /// Session removed.
    SignedOut,

    /// Email verified.
    EmailVerified {
        /// Verified account.
        uid: UserId,
    },

    /// Resend accepted. Says nothing about whether the account exists.
    VerificationResent,

    /// The flow failed.
    Failed {
        /// Why.
        error: AuthError,
    },
}

impl AuthAction {
    /// Whether this action ends a flow.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SignUpCompleted { .. }
                | Self::VerificationRequired { .. }
                | Self::SignedIn { .. }
                | Self::SignedOut
                | Self::EmailVerified { .. }
                | Self::VerificationResent
                | Self::Failed { .. }
        )
    }

    /// The outcome a terminal action stands for.
    #[must_use]
    pub fn outcome(&self) -> Option<AuthOutcome> {
        match self {
            Self::SignUpCompleted { profile } => Some(AuthOutcome::PendingVerification {
                email: profile.email.clone(),
            }),
            Self::VerificationRequired { email } => Some(AuthOutcome::PendingVerification {
                email: email.clone(),
            }),
            Self::SignedIn { session, profile } => Some(AuthOutcome::SignedIn {
                session: session.clone(),
                profile: profile.clone(),
            }),
            Self::SignedOut => Some(AuthOutcome::SignedOut),
            Self::EmailVerified { uid } => Some(AuthOutcome::Verified { uid: *uid }),
            Self::VerificationResent => Some(AuthOutcome::VerificationResent),
            Self::Failed { error } => Some(AuthOutcome::Failed(error.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_not_terminal() {
        let action = AuthAction::SignIn {
            email: "a@b.co".into(),
            password: "secret".into(),
        };
        assert!(!action.is_terminal());
        assert_eq!(action.outcome(), None);
    }

    #[test]
    fn test_failed_maps_to_failed_outcome() {
        let action = AuthAction::Failed {
            error: AuthError::InvalidCredentials,
        };
        assert!(action.is_terminal());
        assert_eq!(
            action.outcome(),
            Some(AuthOutcome::Failed(AuthError::InvalidCredentials))
        );
    }
}
