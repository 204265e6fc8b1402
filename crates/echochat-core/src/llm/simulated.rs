//! Offline inference backend with canned replies.
//!
//! Used when no inference endpoint is configured so the client stays fully
//! usable (and testable) without a model server.

use echochat_types::chat::Message;
use echochat_types::error::InferenceError;
use echochat_types::llm::{ChatRequest, ChatResponse, TokenUsage};
use uuid::Uuid;

use super::client::InferenceClient;

const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
const HELP: &str = "I'm here to assist you. What do you need help with?";
const FAREWELL: &str = "Goodbye! Have a great day!";
const PLACEHOLDER: &str = "I'm a simulated response from your Ollama model. This is a placeholder until you connect to your real API.";

/// Fixed usage reported for every simulated reply.
const SIMULATED_USAGE: TokenUsage = TokenUsage {
    prompt_tokens: 20,
    completion_tokens: 30,
    total_tokens: 50,
};

/// Deterministic inference client keyed on the last message's text.
///
/// Matching is a case-insensitive substring test in priority order:
/// `hello`/`hi`, then `help`, then `bye`. Anything else gets a placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedInferenceClient;

impl SimulatedInferenceClient {
    pub fn new() -> Self {
        Self
    }

    /// The canned reply for `last_message`.
    pub fn reply_for(last_message: &str) -> &'static str {
        let text = last_message.to_lowercase();
        if text.contains("hello") || text.contains("hi") {
            GREETING
        } else if text.contains("help") {
            HELP
        } else if text.contains("bye") {
            FAREWELL
        } else {
            PLACEHOLDER
        }
    }
}

impl InferenceClient for SimulatedInferenceClient {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, InferenceError> {
        let last = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(ChatResponse {
            id: Uuid::new_v4().to_string(),
            message: Message::assistant(Self::reply_for(last), request.model_id.clone()),
            usage: Some(SIMULATED_USAGE),
        })
    }
}
