//! InferenceClient trait definition.

use echochat_types::error::InferenceError;
use echochat_types::llm::{ChatRequest, ChatResponse};

/// Trait for model inference backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in echochat-infra (e.g., `HttpInferenceClient`)
/// and in [`crate::llm::simulated`].
pub trait InferenceClient: Send + Sync {
    /// Short backend name for logs and status output (e.g., "http", "simulated").
    fn name(&self) -> &str;

    /// Produce one assistant reply for the conversation in `request`.
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatResponse, InferenceError>> + Send;
}
