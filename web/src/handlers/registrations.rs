//! Registering for events.
//!
//! Each request runs a fresh registration flow. The repository claim is a
//! single conditional write, so double submissions produce one record: the
//! first answers 201, later ones 200 with the existing registration.

use super::{parse_event_id, unexpected};
use crate::backend::Backend;
use crate::error::AppError;
use crate::extractors::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use event_vibe_events::{Registration, RegistrationAction, RegistrationRepository};
use serde::Serialize;

/// Registration status for one event.
#[derive(Debug, Serialize)]
pub struct RegistrationStatus {
    /// `registered` or `unregistered`.
    pub status: &'static str,
}

/// `GET /api/events/:id/registration`
///
/// # Errors
///
/// 503 when the lookup fails.
pub async fn registration_status<B: Backend>(
    State(state): State<AppState<B>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<RegistrationStatus>, AppError> {
    let event_id = parse_event_id(&id)?;
    let action = RegistrationAction::CheckStatus {
        user_id: user.profile.uid,
        event_id,
    };
    match state.run_registration(action).await? {
        RegistrationAction::StatusResolved { registered } => Ok(Json(RegistrationStatus {
            status: if registered { "registered" } else { "unregistered" },
        })),
        RegistrationAction::RegistrationFailed { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// `POST /api/events/:id/registration`
///
/// # Errors
///
/// 404 for unknown events, 503 when the write fails.
pub async fn register<B: Backend>(
    State(state): State<AppState<B>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let event_id = parse_event_id(&id)?;
    let action = RegistrationAction::Register {
        user_id: user.profile.uid,
        event_id,
    };
    match state.run_registration(action).await? {
        RegistrationAction::RegistrationConfirmed {
            registration,
            newly_created,
        } => {
            let status = if newly_created { StatusCode::CREATED } else { StatusCode::OK };
            Ok((status, Json(registration)))
        }
        RegistrationAction::RegistrationFailed { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// The caller's registrations.
#[derive(Debug, Serialize)]
pub struct RegistrationList {
    /// Most recent first.
    pub registrations: Vec<Registration>,
}

/// `GET /api/me/registrations`
///
/// # Errors
///
/// 503 when storage fails.
pub async fn my_registrations<B: Backend>(
    State(state): State<AppState<B>>,
    user: SessionUser,
) -> Result<Json<RegistrationList>, AppError> {
    let registrations = state.registrations.list_for_user(user.profile.uid).await?;
    Ok(Json(RegistrationList { registrations }))
}
