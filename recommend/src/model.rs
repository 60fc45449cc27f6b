//! The language model boundary.

use crate::error::{RecommendError, Result};
use crate::prompt::RecommendationPrompt;
use crate::schema::output_schema;
use event_vibe_anthropic::messages::DEFAULT_MODEL;
use event_vibe_anthropic::{AnthropicClient, ClaudeError, Message, MessagesRequest, Tool, ToolChoice};
use serde_json::Value;
use std::future::Future;

/// Name of the tool the model must call with its answer.
pub const RECOMMENDATION_TOOL: &str = "record_event_recommendations";

/// Something that can answer a recommendation prompt with raw JSON.
///
/// The returned value is unvalidated; callers run it through
/// [`crate::schema::normalize`].
pub trait RecommendationModel: Send + Sync {
    /// Ask the model.
    ///
    /// # Errors
    ///
    /// Returns a [`RecommendError`] when the model cannot be reached or
    /// gives no structured answer.
    fn generate(
        &self,
        prompt: &RecommendationPrompt,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Claude over the Messages API with a forced tool call.
#[derive(Debug, Clone)]
pub struct ClaudeRecommendationModel {
    client: Option<AnthropicClient>,
    model: String,
    max_tokens: u32,
}

impl ClaudeRecommendationModel {
    /// Use `client` with the default model.
    #[must_use]
    pub fn new(client: AnthropicClient) -> Self {
        Self {
            client: Some(client),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
        }
    }

    /// A model with no API key; every call fails with
    /// [`RecommendError::Unavailable`].
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
        }
    }

    /// Builder: model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: output token cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether an API client is present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn request(&self, prompt: &RecommendationPrompt) -> MessagesRequest {
        MessagesRequest::new(vec![Message::user(prompt.as_str())])
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_system(format!(
                "Return your answer by calling the {RECOMMENDATION_TOOL} tool."
            ))
            .with_tools(vec![Tool {
                name: RECOMMENDATION_TOOL.to_string(),
                description: "Record the recommended events for the user.".to_string(),
                input_schema: output_schema(),
            }])
            .with_tool_choice(ToolChoice::tool(RECOMMENDATION_TOOL))
    }
}

impl RecommendationModel for ClaudeRecommendationModel {
    async fn generate(&self, prompt: &RecommendationPrompt) -> Result<Value> {
        let Some(client) = &self.client else {
            return Err(RecommendError::Unavailable(
                "ANTHROPIC_API_KEY is not set".to_string(),
            ));
        };

        let response = client.messages(self.request(prompt)).await.map_err(upstream_error)?;

        if let Some(input) = response.tool_input(RECOMMENDATION_TOOL) {
            return Ok(input.clone());
        }

        tracing::debug!(stop_reason = ?response.stop_reason, "No tool call, falling back to text");
        extract_json(&response.text()).ok_or(RecommendError::MissingStructuredOutput)
    }
}

/// Map a client failure, logging permanent ones at error level.
fn upstream_error(error: ClaudeError) -> RecommendError {
    if error.is_transient() {
        tracing::warn!(error = %error, "Model call failed");
    } else {
        tracing::error!(error = %error, "Model call rejected");
    }
    match error {
        ClaudeError::Timeout => RecommendError::Timeout,
        other => RecommendError::Upstream(other.to_string()),
    }
}

/// Pull the first JSON object out of free text.
///
/// Tries fenced code blocks first, then the outermost `{ ... }` span.
#[must_use]
pub fn extract_json(text: &str) -> Option<Value> {
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after_fence = &rest[start + 3..];
        let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
        let Some(end) = after_fence[body_start..].find("```") else {
            break;
        };
        let body = &after_fence[body_start..body_start + end];
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(body.trim()) {
            return Some(value);
        }
        rest = &after_fence[body_start + end + 3..];
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RecommendationRequest;
    use serde_json::json;

    #[test]
    fn test_client_failures_map_to_recommend_errors() {
        assert_eq!(upstream_error(ClaudeError::Timeout), RecommendError::Timeout);
        assert!(matches!(
            upstream_error(ClaudeError::RateLimited),
            RecommendError::Upstream(m) if m.contains("Rate limited")
        ));
        assert!(matches!(
            upstream_error(ClaudeError::Unauthorized),
            RecommendError::Upstream(m) if m.contains("invalid API key")
        ));
        assert!(matches!(
            upstream_error(ClaudeError::ApiError { status: 529, message: "overloaded".into() }),
            RecommendError::Upstream(m) if m.contains("529")
        ));
    }

    #[test]
    fn test_extracts_fenced_json() {
        let text = "Sure!\n```json\n{\"eventRecommendations\": []}\n```\nEnjoy.";
        assert_eq!(extract_json(text), Some(json!({"eventRecommendations": []})));
    }

    #[test]
    fn test_skips_non_json_fences() {
        let text = "```\nnot json\n```\n```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_extracts_bare_object() {
        let text = "Here: {\"eventRecommendations\": [{\"name\": \"x\"}]} hope it helps";
        assert_eq!(
            extract_json(text),
            Some(json!({"eventRecommendations": [{"name": "x"}]}))
        );
    }

    #[test]
    fn test_no_json_at_all() {
        assert_eq!(extract_json("I can't help with that."), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_request_forces_the_tool() {
        let model = ClaudeRecommendationModel::new(AnthropicClient::new("k"))
            .with_model("claude-haiku")
            .with_max_tokens(512);
        let prompt = RecommendationPrompt::new(&RecommendationRequest::new("art", "Oslo", "today"));
        let request = model.request(&prompt);

        assert_eq!(request.model, "claude-haiku");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.tool_choice, Some(ToolChoice::tool(RECOMMENDATION_TOOL)));
        assert_eq!(request.tools.map(|t| t.len()), Some(1));
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_unavailable() {
        let model = ClaudeRecommendationModel::unconfigured();
        let prompt = RecommendationPrompt::new(&RecommendationRequest::new("art", "Oslo", "today"));

        assert!(!model.is_configured());
        assert!(matches!(
            model.generate(&prompt).await,
            Err(RecommendError::Unavailable(_))
        ));
    }
}
