//! Error types for events and registrations.

use thiserror::Error;

/// Result type alias for event operations.
pub type Result<T> = std::result::Result<T, EventsError>;

/// Event and registration failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventsError {
    /// A create-event field failed validation. Holds the form message.
    #[error("Invalid event: {0}")]
    InvalidInput(String),

    /// No event with this id.
    #[error("Event not found")]
    EventNotFound,

    /// Reading from the store failed.
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// Writing to the store failed.
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EventsError {
    /// Whether trying again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LoadFailed(_) | Self::SaveFailed(_))
    }

    /// Message safe to show in the UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::EventNotFound => "Event not found".to_string(),
            Self::LoadFailed(_) => "Could not load events. Please try again.".to_string(),
            Self::SaveFailed(_) => "Could not save your changes. Please try again.".to_string(),
            Self::InternalError(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_failures_are_retryable() {
        assert!(EventsError::LoadFailed("timeout".into()).is_retryable());
        assert!(EventsError::SaveFailed("timeout".into()).is_retryable());
        assert!(!EventsError::EventNotFound.is_retryable());
        assert!(!EventsError::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn test_user_message_hides_details() {
        let error = EventsError::LoadFailed("connection refused at 10.0.0.3".into());
        assert!(!error.user_message().contains("10.0.0.3"));
    }
}
