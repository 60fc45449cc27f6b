//! Prompt construction.

use crate::request::RecommendationRequest;

const PERSONA: &str = "You are an event recommendation expert. Given the user's interests, \
location and date, you will recommend events. Generate a unique id for each event.";

const FORMAT: &str = r#"Recommend events in the following format:

```
{
  "eventRecommendations": [
    {
      "id": "event-12345",
      "name": "Event Name",
      "venue": "Venue Name",
      "description": "A short description of the event."
    }
  ]
}
```
"#;

/// The rendered prompt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationPrompt {
    text: String,
}

impl RecommendationPrompt {
    /// Render the prompt for `request`.
    ///
    /// User text is inserted verbatim.
    #[must_use]
    pub fn new(request: &RecommendationRequest) -> Self {
        let group = request
            .group_size
            .map(|size| format!("Group size: {}\n", size.describe()))
            .unwrap_or_default();
        let text = format!(
            "{PERSONA}\n\nInterests: {}\nLocation: {}\nDate: {}\n{group}\n{FORMAT}",
            request.interests, request.location, request.date,
        );

        Self { text }
    }

    /// The prompt text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GroupSize;

    #[test]
    fn test_prompt_carries_every_field() {
        let request = RecommendationRequest::new("food, art", "Austin, TX", "2024-06-01")
            .with_group_size(GroupSize::Small);
        let prompt = RecommendationPrompt::new(&request);
        let text = prompt.as_str();

        assert!(text.starts_with("You are an event recommendation expert."));
        assert!(text.contains("Interests: food, art\n"));
        assert!(text.contains("Location: Austin, TX\n"));
        assert!(text.contains("Date: 2024-06-01\n"));
        assert!(text.contains("Group size: small group (2-5 people)\n"));
        assert!(text.contains("\"eventRecommendations\""));
    }

    #[test]
    fn test_group_size_line_is_optional() {
        let prompt = RecommendationPrompt::new(&RecommendationRequest::new("jazz", "Lyon", "soon"));
        assert!(!prompt.as_str().contains("Group size"));
        assert!(prompt.as_str().contains("Date: soon\n\nRecommend events"));
    }

    #[test]
    fn test_sections_are_separated_by_blank_lines() {
        let request = RecommendationRequest::new("jazz", "Lyon", "soon").with_group_size(GroupSize::Solo);
        let text = RecommendationPrompt::new(&request).as_str().to_string();

        assert!(text.contains("for each event.\n\nInterests: jazz\n"));
        assert!(text.contains("Date: soon\nGroup size: solo (1 person)\n\nRecommend events"));
    }
}
