//! HttpInferenceClient -- [`InferenceClient`] for a self-hosted model server.
//!
//! POSTs the [`ChatRequest`] as JSON to `{base}/api/chat` and expects a
//! [`ChatResponse`] back. Configured `temperature`/`max_tokens` fill in
//! values the request leaves unset.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use echochat_core::catalog;
use echochat_core::llm::client::InferenceClient;
use echochat_types::config::InferenceConfig;
use echochat_types::error::InferenceError;
use echochat_types::llm::{ChatRequest, ChatResponse};

/// Inference client for an HTTP model endpoint.
///
/// The optional API key is a [`SecretString`], only exposed when building
/// the `Authorization` header.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl HttpInferenceClient {
    pub fn new(base_url: &str, config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| InferenceError::RequestFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.expose_secret().trim().is_empty()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_defaults(&self, request: &ChatRequest) -> ChatRequest {
        let mut body = request.clone();
        body.temperature = body.temperature.or(self.temperature);
        body.max_tokens = body.max_tokens.or(self.max_tokens);
        body
    }
}

impl InferenceClient for HttpInferenceClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, InferenceError> {
        if catalog::model_by_id(&request.model_id).is_none() {
            return Err(InferenceError::UnknownModel(request.model_id.clone()));
        }

        let body = self.with_defaults(request);
        let mut builder = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InferenceError::RequestFailed(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => InferenceError::AuthenticationFailed,
                code => InferenceError::Status { status: code, body },
            });
        }

        let mut reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Deserialization(format!("failed to parse response: {e}")))?;

        if reply.message.model.is_none() {
            reply.message.model = Some(request.model_id.clone());
        }
        tracing::debug!(
            model_id = %request.model_id,
            total_tokens = reply.usage.map(|u| u.total_tokens),
            "Inference reply received"
        );
        Ok(reply)
    }
}
