//! Inference request/response types for EchoChat.
//!
//! These mirror the JSON exchanged with the inference endpoint: the full
//! message list plus a model selector goes out, a single reply message
//! (with optional token usage) comes back.

use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Request to the inference endpoint for one reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>, model_id: impl Into<String>) -> Self {
        Self {
            messages,
            model_id: model_id.into(),
            session_id: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Token usage reported for one inference call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reply from the inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_unset_optionals() {
        let request = ChatRequest::new(vec![Message::user("hi")], "llama3");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["modelId"], "llama3");
        assert!(json.get("sessionId").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json.get("maxTokens").is_none());

        let json = serde_json::to_value(request.with_session("s-1")).unwrap();
        assert_eq!(json["sessionId"], "s-1");
    }

    #[test]
    fn test_response_without_usage() {
        let raw = r#"{
            "id": "resp-1",
            "message": {"id": "m", "content": "yo", "role": "assistant", "timestamp": "2024-05-01T10:00:00Z", "model": "mistral"}
        }"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(response.usage.is_none());
        assert_eq!(response.message.content, "yo");
    }
}
