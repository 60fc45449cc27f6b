//! Scripted model for tests.

use crate::error::{RecommendError, Result};
use crate::model::RecommendationModel;
use crate::prompt::RecommendationPrompt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued answers in order and records every prompt it sees.
///
/// When the queue is empty the last answer is repeated; with no answers
/// at all it fails with [`RecommendError::MissingStructuredOutput`].
#[derive(Debug, Clone, Default)]
pub struct MockRecommendationModel {
    answers: Arc<Mutex<VecDeque<Result<Value>>>>,
    last: Arc<Mutex<Option<Result<Value>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockRecommendationModel {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `value`.
    #[must_use]
    pub fn answering(value: Value) -> Self {
        let model = Self::new();
        model.push(Ok(value));
        model
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: RecommendError) -> Self {
        let model = Self::new();
        model.push(Err(error));
        model
    }

    /// Queue another answer.
    pub fn push(&self, answer: Result<Value>) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// Sleep before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_answer(&self) -> Result<Value> {
        let queued = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        let Ok(mut last) = self.last.lock() else {
            return Err(RecommendError::MissingStructuredOutput);
        };
        if let Some(answer) = queued {
            *last = Some(answer);
        }
        last.clone().unwrap_or(Err(RecommendError::MissingStructuredOutput))
    }
}

impl RecommendationModel for MockRecommendationModel {
    async fn generate(&self, prompt: &RecommendationPrompt) -> Result<Value> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.as_str().to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_answer()
    }
}
