//! The signed-in user's profile and navigation.

use crate::backend::Backend;
use crate::error::AppError;
use crate::extractors::{OptionalSessionUser, SessionUser};
use crate::navigation::Navigation;
use crate::state::AppState;
use axum::{extract::State, Json};
use event_vibe_auth::providers::ProfileRepository;
use event_vibe_auth::UserProfile;
use serde::Deserialize;

const MIN_PROFILE_NAME_CHARS: usize = 2;

/// `GET /api/me`
pub async fn get_profile(user: SessionUser) -> Json<UserProfile> {
    Json(user.profile)
}

/// Profile edit form. Only the name can change.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub name: String,
}

/// `PATCH /api/me`
///
/// # Errors
///
/// 400 when the name is shorter than two characters.
pub async fn update_profile<B: Backend>(
    State(state): State<AppState<B>>,
    user: SessionUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let name = request.name.trim();
    if name.chars().count() < MIN_PROFILE_NAME_CHARS {
        return Err(AppError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "Name must be at least 2 characters.",
        ));
    }
    let profile = state.profiles.update_name(user.profile.uid, name).await?;
    tracing::info!(user_id = %profile.uid, "Profile updated");
    Ok(Json(profile))
}

/// `GET /api/navigation`
pub async fn navigation(OptionalSessionUser(user): OptionalSessionUser) -> Json<Navigation> {
    Json(Navigation::for_role(user.map(|user| user.role())))
}
