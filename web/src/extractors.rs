//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id
//! - [`BearerToken`]: the raw `Authorization: Bearer <token>` value
//! - [`SessionUser`]: a live session plus the profile it belongs to
//! - [`OptionalSessionUser`]: the same, or nobody
//! - [`RequireOrganizer`]: a session user whose profile role is organizer
//!
//! The role always comes from the profile document, read on every request.
//!
//! ```ignore
//! async fn create_event<B: Backend>(
//!     State(state): State<AppState<B>>,
//!     RequireOrganizer(user): RequireOrganizer,
//!     Json(form): Json<NewEvent>,
//! ) -> Result<(StatusCode, Json<Event>), AppError> { ... }
//! ```

use crate::backend::Backend;
use crate::error::AppError;
use crate::middleware::correlation_id_from_headers;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use event_vibe_auth::providers::{ProfileRepository, SessionStore};
use event_vibe_auth::{AuthError, Role, Session, SessionId, UserProfile};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Set by the correlation middleware; without it, taken from the
/// `X-Correlation-ID` header or generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        let id = correlation_id_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4);
        Ok(Self(id))
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn from_parts(parts: &Parts) -> Result<Option<Self>, AppError> {
        let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return Ok(None);
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'"))?;
        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }
        Ok(Some(Self(token.to_string())))
    }

    /// The session id the token names.
    ///
    /// # Errors
    ///
    /// Returns 401 when the token is not a session id.
    pub fn session_id(&self) -> Result<SessionId, AppError> {
        self.0
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid session token format"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)?.ok_or_else(|| AppError::unauthorized("Missing authorization header"))
    }
}

/// Authenticated user: a live session and the current profile.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The session.
    pub session: Session,
    /// The profile, freshly loaded.
    pub profile: UserProfile,
}

impl SessionUser {
    async fn resolve<B: Backend>(session_id: SessionId, state: &AppState<B>) -> Result<Self, AuthError> {
        let session = state.sessions.get_session(session_id).await?;
        let profile = state
            .profiles
            .get_profile(session.user_id)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;
        Ok(Self { session, profile })
    }

    /// The profile's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role
    }
}

#[async_trait]
impl<B: Backend> FromRequestParts<AppState<B>> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<B>) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state).await?;
        Ok(Self::resolve(token.session_id()?, state).await?)
    }
}

/// A session user if the request carries a live session.
///
/// Missing, malformed and expired tokens all count as anonymous; only
/// backend failures are errors.
#[derive(Debug, Clone)]
pub struct OptionalSessionUser(pub Option<SessionUser>);

#[async_trait]
impl<B: Backend> FromRequestParts<AppState<B>> for OptionalSessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<B>) -> Result<Self, Self::Rejection> {
        let session_id = match BearerToken::from_parts(parts) {
            Ok(Some(token)) => token.session_id().ok(),
            _ => None,
        };
        let Some(session_id) = session_id else {
            return Ok(Self(None));
        };
        match SessionUser::resolve(session_id, state).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::SessionNotFound | AuthError::SessionExpired) => Ok(Self(None)),
            Err(error) => Err(error.into()),
        }
    }
}

/// A session user whose role is organizer. Participants get 403.
#[derive(Debug, Clone)]
pub struct RequireOrganizer(pub SessionUser);

#[async_trait]
impl<B: Backend> FromRequestParts<AppState<B>> for RequireOrganizer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<B>) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        if user.role() != Role::Organizer {
            tracing::info!(user_id = %user.profile.uid, "Participant denied organizer route");
            return Err(AppError::forbidden("Only organizers can access this page.")
                .with_redirect(user.role().dashboard_path()));
        }
        Ok(Self(user))
    }
}
