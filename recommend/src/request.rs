//! Recommendation input.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// How many people are going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSize {
    /// 1
    Solo,
    /// 2-5
    Small,
    /// 6-10
    Medium,
    /// 10+
    Large,
}

impl GroupSize {
    /// Human-readable description used in the prompt.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Solo => "solo (1 person)",
            Self::Small => "small group (2-5 people)",
            Self::Medium => "medium group (6-10 people)",
            Self::Large => "large group (10+ people)",
        }
    }
}

/// What the group is looking for.
///
/// All fields are free text. `date` is passed to the model as typed and is
/// never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Comma separated interests.
    pub interests: String,
    /// Where the group is.
    pub location: String,
    /// When the group wants to go out.
    pub date: String,
    /// Optional group size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<GroupSize>,
}

impl RecommendationRequest {
    /// Build a request from already joined interests.
    #[must_use]
    pub fn new(
        interests: impl Into<String>,
        location: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            interests: interests.into(),
            location: location.into(),
            date: date.into(),
            group_size: None,
        }
    }

    /// Build a request from a list of picked and typed-in interests.
    ///
    /// Entries are trimmed, blanks dropped and repeats removed (first one
    /// wins) before joining with `", "`.
    #[must_use]
    pub fn from_interest_list(
        interests: &[String],
        location: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(join_interests(interests), location, date)
    }

    /// Builder: set the group size.
    #[must_use]
    pub const fn with_group_size(mut self, group_size: GroupSize) -> Self {
        self.group_size = Some(group_size);
        self
    }

    /// Reject requests with a blank field.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::InvalidInput`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        if self.interests.trim().is_empty() {
            return Err(RecommendError::InvalidInput(
                "Please select or add at least one interest.".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(RecommendError::InvalidInput("Please enter a location.".to_string()));
        }
        if self.date.trim().is_empty() {
            return Err(RecommendError::InvalidInput("Please enter a date.".to_string()));
        }
        Ok(())
    }
}

fn join_interests(interests: &[String]) -> String {
    let mut kept: Vec<&str> = Vec::with_capacity(interests.len());
    for interest in interests.iter().map(|i| i.trim()) {
        if !interest.is_empty() && !kept.contains(&interest) {
            kept.push(interest);
        }
    }
    kept.join(", ")
}
