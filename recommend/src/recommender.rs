//! The recommendation service.

use crate::error::{RecommendError, Result};
use crate::model::RecommendationModel;
use crate::prompt::RecommendationPrompt;
use crate::request::RecommendationRequest;
use crate::schema::{normalize, RecommendationSet};
use std::sync::Arc;
use std::time::Duration;

/// Recommender settings.
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Upper bound on one model call.
    pub timeout: Duration,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl RecommenderConfig {
    /// Builder: timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Validates input, asks the model once and validates the answer.
///
/// Stateless: identical requests may return different suggestions.
#[derive(Debug)]
pub struct Recommender<M> {
    model: Arc<M>,
    config: RecommenderConfig,
}

impl<M> Clone for Recommender<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            config: self.config.clone(),
        }
    }
}

impl<M: RecommendationModel> Recommender<M> {
    /// Create a recommender around `model`.
    #[must_use]
    pub fn new(model: M, config: RecommenderConfig) -> Self {
        Self {
            model: Arc::new(model),
            config,
        }
    }

    /// The underlying model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Produce validated recommendations for `request`.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::InvalidInput`] when a field is blank (the model is
    ///   not called)
    /// - any other variant when the model times out, fails or answers with
    ///   something that does not validate; all of these are retryable
    #[tracing::instrument(skip_all, fields(location = %request.location))]
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationSet> {
        request.validate()?;
        metrics::counter!("recommendations.requests").increment(1);

        let prompt = RecommendationPrompt::new(request);
        let result = match tokio::time::timeout(self.config.timeout, self.model.generate(&prompt)).await {
            Ok(answer) => answer.and_then(normalize),
            Err(_) => Err(RecommendError::Timeout),
        };

        match &result {
            Ok(set) => tracing::info!(count = set.len(), "Recommendations generated"),
            Err(e) => {
                metrics::counter!("recommendations.failures").increment(1);
                tracing::warn!(error = %e, "Recommendation request failed");
            }
        }

        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::mocks::MockRecommendationModel;
    use serde_json::json;

    fn answer() -> serde_json::Value {
        json!({"eventRecommendations": [
            {"name": "Taco Crawl", "venue": "East 6th", "description": "Five taquerias in one night."}
        ]})
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_the_model() {
        let model = MockRecommendationModel::answering(answer());
        let recommender = Recommender::new(model, RecommenderConfig::default());

        let result = recommender
            .recommend(&RecommendationRequest::new("food", "", "2024-06-01"))
            .await;

        assert!(matches!(result, Err(RecommendError::InvalidInput(_))));
        assert!(recommender.model().prompts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_id_is_filled() {
        let recommender = Recommender::new(
            MockRecommendationModel::answering(answer()),
            RecommenderConfig::default(),
        );

        let set = recommender
            .recommend(&RecommendationRequest::new("food", "Austin, TX", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(set.len(), 1);
        assert!(!set.event_recommendations[0].id.is_empty());
        assert_eq!(set.event_recommendations[0].name, "Taco Crawl");
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let model = MockRecommendationModel::answering(answer()).with_delay(Duration::from_millis(200));
        let recommender = Recommender::new(
            model,
            RecommenderConfig::default().with_timeout(Duration::from_millis(20)),
        );

        let result = recommender
            .recommend(&RecommendationRequest::new("food", "Austin", "today"))
            .await;

        assert_eq!(result, Err(RecommendError::Timeout));
        assert!(result.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_schema_violation_surfaces_without_partial_results() {
        let recommender = Recommender::new(
            MockRecommendationModel::answering(json!({"eventRecommendations": [{"name": "x"}]})),
            RecommenderConfig::default(),
        );

        let result = recommender
            .recommend(&RecommendationRequest::new("food", "Austin", "today"))
            .await;

        assert!(matches!(result, Err(RecommendError::SchemaViolation(_))));
    }
}
