//! Router configuration.

use crate::backend::Backend;
use crate::handlers::{auth, events, health, profile, recommendations, registrations};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks sit at the root; everything else is under `/api`. Every
/// request passes through the correlation id layer and `TraceLayer`.
pub fn build_router<B: Backend>(state: AppState<B>) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up", post(auth::sign_up::<B>))
        .route("/sign-in", post(auth::sign_in::<B>))
        .route("/sign-out", post(auth::sign_out::<B>))
        .route("/verify-email", post(auth::verify_email::<B>))
        .route("/resend-verification", post(auth::resend_verification::<B>));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route(
            "/me",
            get(profile::get_profile).patch(profile::update_profile::<B>),
        )
        .route("/me/registrations", get(registrations::my_registrations::<B>))
        .route("/navigation", get(profile::navigation))
        .route(
            "/events",
            get(events::list_events::<B>).post(events::create_event::<B>),
        )
        .route("/events/:id", get(events::get_event::<B>))
        .route(
            "/events/:id/registration",
            get(registrations::registration_status::<B>).post(registrations::register::<B>),
        )
        .route("/organizer/events", get(events::organizer_events::<B>))
        .route("/recommendations", post(recommendations::recommend::<B>));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready::<B>))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
