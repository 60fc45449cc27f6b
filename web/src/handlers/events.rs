//! Event publishing and browsing.

use super::parse_event_id;
use crate::backend::Backend;
use crate::error::AppError;
use crate::extractors::RequireOrganizer;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use event_vibe_events::{Event, EventRepository, EventsError, NewEvent};
use serde::Serialize;

/// A list of events.
#[derive(Debug, Serialize)]
pub struct EventList {
    /// Events in the order the endpoint documents.
    pub events: Vec<Event>,
}

/// `POST /api/events`: organizers only.
///
/// # Errors
///
/// 400 with the first failing field's message, 403 for participants.
pub async fn create_event<B: Backend>(
    State(state): State<AppState<B>>,
    RequireOrganizer(organizer): RequireOrganizer,
    Json(form): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = form.into_event(organizer.profile.uid, state.clock.now())?;
    state.events.create_event(&event).await?;
    tracing::info!(event_id = %event.id, organizer = %organizer.profile.uid, "Event published");
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /api/events`: soonest first.
///
/// # Errors
///
/// 503 when storage fails.
pub async fn list_events<B: Backend>(State(state): State<AppState<B>>) -> Result<Json<EventList>, AppError> {
    let events = state.events.list_upcoming().await?;
    Ok(Json(EventList { events }))
}

/// `GET /api/events/:id`
///
/// # Errors
///
/// 404 for unknown ids.
pub async fn get_event<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let id = parse_event_id(&id)?;
    let event = state.events.get_event(id).await?.ok_or(EventsError::EventNotFound)?;
    Ok(Json(event))
}

/// `GET /api/organizer/events`: newest first.
///
/// # Errors
///
/// 403 for participants.
pub async fn organizer_events<B: Backend>(
    State(state): State<AppState<B>>,
    RequireOrganizer(_): RequireOrganizer,
) -> Result<Json<EventList>, AppError> {
    let events = state.events.list_recent().await?;
    Ok(Json(EventList { events }))
}
