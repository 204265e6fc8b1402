//! BoxInferenceClient -- object-safe dynamic dispatch wrapper for InferenceClient.
//!
//! 1. `InferenceClientDyn` is an object-safe twin with boxed futures
//! 2. A blanket impl covers every `T: InferenceClient`
//! 3. `BoxInferenceClient` wraps `Box<dyn InferenceClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use echochat_types::error::InferenceError;
use echochat_types::llm::{ChatRequest, ChatResponse};

use super::client::InferenceClient;

/// Object-safe version of [`InferenceClient`] with boxed futures.
pub trait InferenceClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, InferenceError>> + Send + 'a>>;
}

impl<T: InferenceClient> InferenceClientDyn for T {
    fn name(&self) -> &str {
        InferenceClient::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, InferenceError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased inference client, chosen at runtime from configuration.
pub struct BoxInferenceClient {
    inner: Box<dyn InferenceClientDyn + Send + Sync>,
}

impl BoxInferenceClient {
    pub fn new<T: InferenceClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }
}

impl InferenceClient for BoxInferenceClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, InferenceError> {
        self.inner.complete_boxed(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::simulated::SimulatedInferenceClient;
    use echochat_types::chat::Message;

    #[tokio::test]
    async fn test_boxed_client_delegates() {
        let client = BoxInferenceClient::new(SimulatedInferenceClient::new());
        assert_eq!(InferenceClient::name(&client), "simulated");

        let request = ChatRequest::new(vec![Message::user("bye now")], "mistral");
        let response = client.complete(&request).await.unwrap();
        assert_eq!(response.message.content, "Goodbye! Have a great day!");
    }
}
