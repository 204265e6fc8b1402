//! Inference client implementations.
//!
//! Provides [`HttpInferenceClient`] and the factory
//! ([`create_inference_client`]) that picks the backend from configuration.

pub mod http_client;

use echochat_core::llm::box_client::BoxInferenceClient;
use echochat_core::llm::simulated::SimulatedInferenceClient;
use echochat_types::config::InferenceConfig;
use echochat_types::error::InferenceError;

use self::http_client::HttpInferenceClient;

/// Create a [`BoxInferenceClient`] from an [`InferenceConfig`].
///
/// A configured, non-blank `base_url` selects [`HttpInferenceClient`];
/// otherwise replies are simulated and a warning is logged.
pub fn create_inference_client(config: &InferenceConfig) -> Result<BoxInferenceClient, InferenceError> {
    match config.base_url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
        Some(base_url) => {
            tracing::info!(base_url = %base_url, "Using HTTP inference endpoint");
            Ok(BoxInferenceClient::new(HttpInferenceClient::new(base_url, config)?))
        }
        None => {
            tracing::warn!("No inference base_url configured. Using simulated responses.");
            Ok(BoxInferenceClient::new(SimulatedInferenceClient::new()))
        }
    }
}
