//! Client configuration types for EchoChat.
//!
//! `ClientConfig` represents the top-level `config.toml` that controls the
//! remote session endpoint, the inference endpoint, the default model and
//! background sync limits. Every field has a default so an empty (or
//! missing) file yields a fully local, simulated-inference client.
//!
//! API keys are held as [`SecretString`] so they never reach `Debug` output
//! or logs.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_MODEL_ID;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Model assigned to newly created sessions.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_remote_timeout_secs() -> u64 {
    10
}

fn default_inference_timeout_secs() -> u64 {
    120
}

fn default_max_concurrent_mirrors() -> usize {
    4
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            remote: RemoteConfig::default(),
            inference: InferenceConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Remote session store endpoint.
///
/// With no `base_url` every remote operation is disabled and the client
/// behaves as pure local storage.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

/// Model inference endpoint.
///
/// With no `base_url` a deterministic simulated reply is produced instead.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_inference_timeout_secs(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Limits for background remote mirroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_max_concurrent_mirrors")]
    pub max_concurrent_mirrors: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_mirrors: default_max_concurrent_mirrors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_client_config_default_values() {
        let config = ClientConfig::default();
        assert_eq!(config.default_model, "llama3");
        assert!(config.remote.base_url.is_none());
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(config.inference.base_url.is_none());
        assert_eq!(config.sync.max_concurrent_mirrors, 4);
    }

    #[test]
    fn test_client_config_deserialize_empty() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_model, "llama3");
        assert_eq!(config.inference.timeout_secs, 120);
    }

    #[test]
    fn test_client_config_deserialize_with_values() {
        let toml_str = r#"
default_model = "mistral"

[remote]
base_url = "https://sync.example.com"
api_key = "secret-key"
timeout_secs = 3

[inference]
base_url = "http://localhost:11434"
temperature = 0.2

[sync]
max_concurrent_mirrors = 8
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_model, "mistral");
        assert_eq!(config.remote.base_url.as_deref(), Some("https://sync.example.com"));
        assert_eq!(config.remote.timeout_secs, 3);
        assert_eq!(
            config.remote.api_key.as_ref().map(|k| k.expose_secret()),
            Some("secret-key")
        );
        assert_eq!(config.inference.temperature, Some(0.2));
        assert_eq!(config.inference.timeout_secs, 120);
        assert_eq!(config.sync.max_concurrent_mirrors, 8);
    }

    #[test]
    fn test_debug_redacts_api_keys() {
        let remote = RemoteConfig {
            api_key: Some(SecretString::from("super-secret")),
            ..RemoteConfig::default()
        };
        let rendered = format!("{remote:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));

        let config: ClientConfig = toml::from_str("[inference]\napi_key = \"sk-inf\"").unwrap();
        assert!(!format!("{config:?}").contains("sk-inf"));
    }
}
