//! Sign-up, sign-in, sign-out and email verification endpoints.
//!
//! Each handler runs one [`AuthAction`] through a fresh auth flow and maps
//! the [`AuthOutcome`] to a response. A sign-in with an unverified email is
//! a 403 carrying the redirect to the verification page; the client is
//! expected to follow `redirect` fields.

use super::unexpected;
use crate::backend::Backend;
use crate::error::AppError;
use crate::extractors::BearerToken;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use event_vibe_auth::{AuthAction, AuthOutcome, Role, UserProfile};
use serde::{Deserialize, Serialize};

/// Page the client lands on after sign-up or an unverified sign-in.
fn verify_email_redirect(email: &str) -> String {
    format!("/verify-email?email={}", urlencoding::encode(email))
}

/// Sign-up form.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    /// Email.
    pub email: String,
    /// Password, at least 6 characters.
    pub password: String,
    /// Full name.
    pub name: String,
    /// Organizer or participant; fixed for the life of the account.
    #[serde(default)]
    pub role: Role,
    /// City or area.
    pub location: String,
}

/// Verification pending; the user must open the emailed link.
#[derive(Debug, Serialize)]
pub struct PendingVerificationResponse {
    /// Always `pending_verification`.
    pub status: &'static str,
    /// Where the email went.
    pub email: String,
    /// Verification page.
    pub redirect: String,
}

impl PendingVerificationResponse {
    fn new(email: String) -> Self {
        Self {
            status: "pending_verification",
            redirect: verify_email_redirect(&email),
            email,
        }
    }
}

/// `POST /api/auth/sign-up`
///
/// # Errors
///
/// 400 for invalid input, 409 when the email is taken.
pub async fn sign_up<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<PendingVerificationResponse>), AppError> {
    let action = AuthAction::SignUp {
        email: request.email,
        password: request.password,
        name: request.name,
        role: request.role,
        location: request.location,
    };
    match state.run_auth(action).await? {
        AuthOutcome::PendingVerification { email } => {
            Ok((StatusCode::CREATED, Json(PendingVerificationResponse::new(email))))
        }
        AuthOutcome::Failed(error) => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// A fresh session.
#[derive(Debug, Serialize)]
pub struct SignedInResponse {
    /// Always `signed_in`.
    pub status: &'static str,
    /// Bearer token for later requests.
    pub session_token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
    /// The user's profile.
    pub user: UserProfile,
    /// Role dashboard.
    pub redirect: &'static str,
}

/// `POST /api/auth/sign-in`
///
/// # Errors
///
/// 401 for bad credentials, 403 `EMAIL_NOT_VERIFIED` (a new link has been
/// sent), 404 when the profile is missing.
pub async fn sign_in<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignedInResponse>, AppError> {
    let action = AuthAction::SignIn {
        email: request.email,
        password: request.password,
    };
    match state.run_auth(action).await? {
        AuthOutcome::SignedIn { session, profile } => Ok(Json(SignedInResponse {
            status: "signed_in",
            session_token: session.session_id.to_string(),
            expires_at: session.expires_at,
            redirect: profile.role.dashboard_path(),
            user: profile,
        })),
        AuthOutcome::PendingVerification { email } => Err(AppError::new(
            StatusCode::FORBIDDEN,
            "EMAIL_NOT_VERIFIED",
            "Please verify your email before signing in. We've sent you a new verification link.",
        )
        .with_redirect(verify_email_redirect(&email))),
        AuthOutcome::Failed(error) => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Simple status body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// What happened.
    pub status: &'static str,
    /// Where to go next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

/// `POST /api/auth/sign-out`
///
/// Succeeds for sessions that are already gone.
///
/// # Errors
///
/// 401 when the bearer token is missing or malformed.
pub async fn sign_out<B: Backend>(
    State(state): State<AppState<B>>,
    token: BearerToken,
) -> Result<Json<StatusResponse>, AppError> {
    let session_id = token.session_id()?;
    match state.run_auth(AuthAction::SignOut { session_id }).await? {
        AuthOutcome::SignedOut => Ok(Json(StatusResponse {
            status: "signed_out",
            redirect: Some("/login"),
        })),
        AuthOutcome::Failed(error) => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Parameters of the emailed verification link.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    /// Must be `verifyEmail`.
    pub mode: String,
    /// The one-time code.
    pub oob_code: String,
}

/// `POST /api/auth/verify-email`
///
/// # Errors
///
/// 400 for a wrong mode or an unknown, used or expired code.
pub async fn verify_email<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    if request.mode != "verifyEmail" {
        return Err(AppError::bad_request("Invalid verification link."));
    }
    let action = AuthAction::ApplyVerificationCode {
        code: request.oob_code,
    };
    match state.run_auth(action).await? {
        AuthOutcome::Verified { uid } => {
            tracing::info!(user_id = %uid, "Email verified");
            Ok(Json(StatusResponse {
                status: "verified",
                redirect: Some("/login"),
            }))
        }
        AuthOutcome::Failed(error) => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Resend form.
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    /// Address to resend to.
    pub email: String,
}

/// `POST /api/auth/resend-verification`
///
/// Answers 202 whether or not the address has an unverified account.
///
/// # Errors
///
/// 429 when the address has been sent too many links recently.
pub async fn resend_verification<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), AppError> {
    let action = AuthAction::ResendVerification { email: request.email };
    match state.run_auth(action).await? {
        AuthOutcome::VerificationResent => Ok((
            StatusCode::ACCEPTED,
            Json(StatusResponse {
                status: "verification_sent",
                redirect: None,
            }),
        )),
        AuthOutcome::Failed(error) => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_redirect_is_encoded() {
        assert_eq!(
            verify_email_redirect("a+b@example.com"),
            "/verify-email?email=a%2Bb%40example.com"
        );
    }
}
