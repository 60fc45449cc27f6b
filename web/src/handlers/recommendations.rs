//! Group event recommendations.

use crate::backend::Backend;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use event_vibe_recommend::{RecommendationRequest, RecommendationSet};

/// `POST /api/recommendations`
///
/// Body and response use the camelCase recommendation shape:
/// `{"interests", "location", "date", "groupSize"?}` in,
/// `{"eventRecommendations": [{id, name, venue, description}]}` out.
///
/// # Errors
///
/// 400 for blank fields, 502 `RECOMMENDATION_FAILED` for any model failure.
pub async fn recommend<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationSet>, AppError> {
    let set = state.recommender.recommend(&request).await?;
    Ok(Json(set))
}
