//! Recommendation errors.

use thiserror::Error;

/// Message shown to users for every upstream failure.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "We couldn't generate recommendations right now. Please try again.";

/// Result type for recommendation operations.
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Recommendation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecommendError {
    /// The request itself is unusable; the model was not called.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No model is configured.
    #[error("Recommendation model unavailable: {0}")]
    Unavailable(String),

    /// The model did not answer in time.
    #[error("Recommendation request timed out")]
    Timeout,

    /// Transport or API failure talking to the model.
    #[error("Upstream model failed: {0}")]
    Upstream(String),

    /// The model answered without any parseable structured output.
    #[error("Model returned no structured output")]
    MissingStructuredOutput,

    /// The structured output does not match the recommendation shape.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

impl RecommendError {
    /// Every failure except bad input may succeed on a later attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }

    /// Text safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(reason) => reason.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failures_share_one_message() {
        for error in [
            RecommendError::Timeout,
            RecommendError::Upstream("502".into()),
            RecommendError::MissingStructuredOutput,
            RecommendError::SchemaViolation("name".into()),
            RecommendError::Unavailable("no key".into()),
        ] {
            assert!(error.is_retryable());
            assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let error = RecommendError::InvalidInput("Location is required.".into());
        assert!(!error.is_retryable());
        assert_eq!(error.user_message(), "Location is required.");
    }
}
