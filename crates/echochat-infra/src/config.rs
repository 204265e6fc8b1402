//! Client configuration loader for EchoChat.
//!
//! Reads `config.toml` from the data directory (`~/.echochat/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when
//! the file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use echochat_types::config::ClientConfig;
use secrecy::SecretString;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ECHOCHAT_DATA_DIR";
pub const REMOTE_URL_ENV: &str = "ECHOCHAT_REMOTE_URL";
pub const REMOTE_API_KEY_ENV: &str = "ECHOCHAT_REMOTE_API_KEY";
pub const INFERENCE_URL_ENV: &str = "ECHOCHAT_INFERENCE_URL";
pub const INFERENCE_API_KEY_ENV: &str = "ECHOCHAT_INFERENCE_API_KEY";

/// Resolve the data directory.
///
/// Priority: explicit override (`--data-dir`), then `ECHOCHAT_DATA_DIR`,
/// then `~/.echochat`, then `./.echochat` when no home directory exists.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".echochat");
    }

    PathBuf::from(".echochat")
}

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ClientConfig::default()`] (local-only, simulated inference).
/// - Unreadable or unparsable file: logs a warning and returns the default.
/// - Environment overrides are applied on top in every case.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

async fn read_config_file(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Overlay endpoint settings from the environment. Blank values are ignored.
pub fn apply_env_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = var(REMOTE_URL_ENV) {
        config.remote.base_url = Some(url);
    }
    if let Some(key) = var(REMOTE_API_KEY_ENV) {
        config.remote.api_key = Some(SecretString::from(key));
    }
    if let Some(url) = var(INFERENCE_URL_ENV) {
        config.inference.base_url = Some(url);
    }
    if let Some(key) = var(INFERENCE_API_KEY_ENV) {
        config.inference.api_key = Some(SecretString::from(key));
    }
    config
}
