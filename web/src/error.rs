//! Error types for web handlers.
//!
//! Every domain error is mapped into an [`AppError`]: an HTTP status, a
//! stable `code` the client can branch on and a message that is safe to
//! show. Server errors are logged with their source.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use event_vibe_auth::AuthError;
use event_vibe_events::EventsError;
use event_vibe_recommend::RecommendError;
use event_vibe_runtime::StoreError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState<B>>) -> Result<Json<Event>, AppError> {
///     let event = state.events.get_event(id).await?
///         .ok_or_else(|| AppError::not_found("Event not found"))?;
///     Ok(Json(event))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Where the client should go next, if anywhere.
    redirect: Option<String>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            redirect: None,
            source: None,
        }
    }

    /// Attach the error that caused this one.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Tell the client where to navigate.
    #[must_use]
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message)
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(status = %self.status, code = %self.code, "Request failed"),
            }
        } else {
            tracing::debug!(status = %self.status, code = %self.code, "Request rejected");
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            redirect: self.redirect,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An unexpected error occurred. Please try again.").with_source(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let (status, code) = match &err {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::EmailInUse => (StatusCode::CONFLICT, "EMAIL_IN_USE"),
            AuthError::InvalidEmail | AuthError::WeakPassword | AuthError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            AuthError::ProfileNotFound => (StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND"),
            AuthError::SessionNotFound | AuthError::SessionExpired => {
                (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED")
            }
            AuthError::VerificationCodeInvalid => (StatusCode::BAD_REQUEST, "INVALID_VERIFICATION_CODE"),
            AuthError::TooManyAttempts { .. } => (StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_ATTEMPTS"),
            AuthError::Unavailable(_) | AuthError::DatabaseError(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            AuthError::EmailError(_) => (StatusCode::BAD_GATEWAY, "EMAIL_FAILED"),
            AuthError::SerializationError(_) | AuthError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        };
        let app = Self::new(status, code, err.user_message());
        if status.is_server_error() {
            app.with_source(err)
        } else {
            app
        }
    }
}

impl From<EventsError> for AppError {
    fn from(err: EventsError) -> Self {
        let (status, code) = match &err {
            EventsError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            EventsError::EventNotFound => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
            EventsError::LoadFailed(_) | EventsError::SaveFailed(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            EventsError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };
        let app = Self::new(status, code, err.user_message());
        if status.is_server_error() {
            app.with_source(err)
        } else {
            app
        }
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.user_message())
            }
            _ => Self::new(StatusCode::BAD_GATEWAY, "RECOMMENDATION_FAILED", err.user_message())
                .with_source(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => Self::unavailable("The request took too long. Please try again.")
                .with_source(err),
            StoreError::ChannelClosed => {
                Self::internal("An unexpected error occurred. Please try again.").with_source(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_vibe_recommend::error::GENERIC_FAILURE_MESSAGE;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_auth_error_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::EmailInUse, StatusCode::CONFLICT),
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::SessionExpired, StatusCode::UNAUTHORIZED),
            (
                AuthError::TooManyAttempts {
                    retry_after: std::time::Duration::from_secs(60),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AuthError::Unavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::InternalError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn test_auth_message_is_user_facing() {
        let err = AppError::from(AuthError::DatabaseError("relation accounts".into()));
        assert!(!err.message().contains("accounts"));
    }

    #[test]
    fn test_recommendation_failures_collapse_to_one_code() {
        for error in [RecommendError::Timeout, RecommendError::MissingStructuredOutput] {
            let err = AppError::from(error);
            assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
            assert_eq!(err.code(), "RECOMMENDATION_FAILED");
            assert_eq!(err.message(), GENERIC_FAILURE_MESSAGE);
        }
        let err = AppError::from(RecommendError::InvalidInput("Location is required.".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_events_errors() {
        assert_eq!(AppError::from(EventsError::EventNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(EventsError::LoadFailed("timeout".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_timeout_is_unavailable() {
        assert_eq!(AppError::from(StoreError::Timeout).status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
