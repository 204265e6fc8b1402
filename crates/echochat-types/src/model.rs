//! Model catalog entry type.

use serde::{Deserialize, Serialize};

/// Identifier of the model new sessions use unless configured otherwise.
pub const DEFAULT_MODEL_ID: &str = "llama3";

/// A model the user can chat with.
///
/// Read-only reference data; sessions only persist the chosen `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Maximum context window in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}
