//! Error types for account and session operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication failures.
///
/// Every variant has a [`AuthError::user_message`] that is safe to show in
/// the UI; the `Display` text is for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Credentials and sign-up input

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("Email already in use")]
    EmailInUse,

    /// Email address is not syntactically valid.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password shorter than the minimum length.
    #[error("Password too short")]
    WeakPassword,

    /// A required sign-up or profile field is missing or too short.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Profiles and sessions

    /// The account has no profile document.
    #[error("Profile not found")]
    ProfileNotFound,

    /// Session not found.
    #[error("Session not found")]
    SessionNotFound,

    /// Session has expired.
    #[error("Session has expired")]
    SessionExpired,

    /// Verification code is unknown, already used or expired.
    #[error("Invalid or expired verification code")]
    VerificationCodeInvalid,

    // Rate limiting

    /// Too many attempts for this key.
    #[error("Too many attempts, please retry after {retry_after:?}")]
    TooManyAttempts {
        /// Duration to wait before retrying
        retry_after: std::time::Duration,
    },

    // System

    /// A backing service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    EmailError(String),

    /// Session encoding failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use event_vibe_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::InternalError("boom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::EmailInUse
                | Self::InvalidEmail
                | Self::WeakPassword
                | Self::InvalidInput(_)
                | Self::VerificationCodeInvalid
        )
    }

    /// Returns `true` for failures of a backing service, where trying again
    /// later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_)
                | Self::DatabaseError(_)
                | Self::EmailError(_)
                | Self::TooManyAttempts { .. }
        )
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "The email or password you entered is incorrect.".into(),
            Self::EmailInUse => "An account with this email already exists. Please sign in.".into(),
            Self::InvalidEmail => "Please enter a valid email address.".into(),
            Self::WeakPassword => "Password must be at least 6 characters.".into(),
            Self::InvalidInput(reason) => reason.clone(),
            Self::ProfileNotFound => "Could not find user profile.".into(),
            Self::SessionNotFound | Self::SessionExpired => {
                "Your session has expired. Please sign in again.".into()
            }
            Self::VerificationCodeInvalid => {
                "The verification link is invalid or has expired. Please request a new one.".into()
            }
            Self::TooManyAttempts { .. } => {
                "Too many attempts. Please wait a few minutes and try again.".into()
            }
            Self::Unavailable(_) => {
                "Could not connect to the server. Please check your internet connection.".into()
            }
            Self::EmailError(_) => "Could not send verification email.".into(),
            Self::DatabaseError(_) | Self::SerializationError(_) | Self::InternalError(_) => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }
}
