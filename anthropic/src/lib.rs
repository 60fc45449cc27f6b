//! # Anthropic Claude API Client
//!
//! Client for the non-streaming Messages API with tool use, which is all
//! the recommendation service needs.
//!
//! ## Example
//!
//! ```no_run
//! use event_vibe_anthropic::{AnthropicClient, MessagesRequest, Tool, ToolChoice};
//! use event_vibe_anthropic::types::Message;
//!
//! # async fn run() -> Result<(), event_vibe_anthropic::ClaudeError> {
//! let client = AnthropicClient::from_env()?;
//!
//! let request = MessagesRequest::new(vec![Message::user("Suggest three events")])
//!     .with_tools(vec![Tool {
//!         name: "record_events".to_string(),
//!         description: "Record the suggested events".to_string(),
//!         input_schema: serde_json::json!({"type": "object"}),
//!     }])
//!     .with_tool_choice(ToolChoice::tool("record_events"));
//!
//! let response = client.messages(request).await?;
//! let structured = response.tool_input("record_events");
//! # let _ = structured;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod messages;
pub mod types;

// Re-export main types for convenience
pub use client::AnthropicClient;
pub use error::ClaudeError;
pub use messages::{MessagesRequest, MessagesResponse, ToolChoice};
pub use types::{ContentBlock, Message, Role, StopReason, Tool, Usage};
