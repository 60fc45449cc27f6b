//! Output shape and validation of model answers.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// One suggested event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecommendation {
    /// Unique within its [`RecommendationSet`], never empty.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Where it happens.
    pub venue: String,
    /// Short description.
    pub description: String,
}

/// A validated model answer.
///
/// Serializes exactly as `{"eventRecommendations": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// The suggestions, in model order.
    #[serde(rename = "eventRecommendations")]
    pub event_recommendations: Vec<EventRecommendation>,
}

impl RecommendationSet {
    /// Number of suggestions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.event_recommendations.len()
    }

    /// `true` when the model suggested nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_recommendations.is_empty()
    }
}

/// JSON schema the model's structured output must follow.
#[must_use]
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "eventRecommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string", "description": "A unique identifier for the event."},
                        "name": {"type": "string", "description": "The name of the event."},
                        "venue": {"type": "string", "description": "The venue of the event."},
                        "description": {"type": "string", "description": "A short description of the event."}
                    },
                    "required": ["id", "name", "venue", "description"]
                }
            }
        },
        "required": ["eventRecommendations"]
    })
}

/// Validate a raw model answer and assign ids.
///
/// `name`, `venue` and `description` must be non-blank strings and are kept
/// byte for byte. An `id` that is missing, not a string, blank, or already
/// used by an earlier item is replaced with a random UUID. Unknown fields
/// are dropped.
///
/// # Errors
///
/// Returns [`RecommendError::SchemaViolation`] when the answer is not an
/// object with an `eventRecommendations` array, or when any item is
/// malformed. No partial result is produced.
pub fn normalize(value: Value) -> Result<RecommendationSet> {
    let Value::Object(mut root) = value else {
        return Err(violation("answer is not a JSON object"));
    };
    let Some(Value::Array(items)) = root.remove("eventRecommendations") else {
        return Err(violation("missing eventRecommendations array"));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut event_recommendations = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(mut fields) = item else {
            return Err(violation(format!("item {index} is not an object")));
        };

        let name = required_text(&mut fields, "name", index)?;
        let venue = required_text(&mut fields, "venue", index)?;
        let description = required_text(&mut fields, "description", index)?;

        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.trim().is_empty() && !seen.contains(&id) => id,
            _ => Uuid::new_v4().to_string(),
        };
        seen.insert(id.clone());

        event_recommendations.push(EventRecommendation {
            id,
            name,
            venue,
            description,
        });
    }

    Ok(RecommendationSet {
        event_recommendations,
    })
}

fn required_text(fields: &mut Map<String, Value>, key: &str, index: usize) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        Some(Value::String(_)) => Err(violation(format!("item {index}: {key} is empty"))),
        Some(_) => Err(violation(format!("item {index}: {key} is not a string"))),
        None => Err(violation(format!("item {index}: {key} is missing"))),
    }
}

fn violation(reason: impl Into<String>) -> RecommendError {
    RecommendError::SchemaViolation(reason.into())
}
