//! # Event Vibe Recommendations
//!
//! Turns a group's interests, location and date into event suggestions from
//! a language model.
//!
//! The model's answer is never trusted: [`normalize`] checks it against the
//! `{"eventRecommendations": [{id, name, venue, description}]}` shape and
//! fills in missing or repeated ids before anything is returned. Every
//! failure past input validation collapses into one retryable error family.
//!
//! ```ignore
//! let recommender = Recommender::new(ClaudeRecommendationModel::new(client), RecommenderConfig::default());
//! let request = RecommendationRequest::new("food, art", "Austin, TX", "2024-06-01");
//! let set = recommender.recommend(&request).await?;
//! ```

pub mod error;
pub mod model;
pub mod prompt;
pub mod recommender;
pub mod request;
pub mod schema;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{RecommendError, Result};
pub use model::{ClaudeRecommendationModel, RecommendationModel};
pub use prompt::RecommendationPrompt;
pub use recommender::{Recommender, RecommenderConfig};
pub use request::{GroupSize, RecommendationRequest};
pub use schema::{normalize, output_schema, EventRecommendation, RecommendationSet};
