//! Key-value store trait.
//!
//! The local equivalent of browser storage: a handful of durable string
//! values addressed by fixed keys. Synchronous, since there is no
//! network behind it.

use echochat_types::error::StoreError;

/// Key holding the JSON array of all locally cached chat sessions.
pub const SESSIONS_KEY: &str = "echo-chat-sessions";

/// Key holding the device identity string.
pub const DEVICE_ID_KEY: &str = "echo-chat-device-id";

/// Trait for durable string key-value storage.
///
/// Implementations live in echochat-infra (`FileKeyValueStore`) and in
/// [`super::memory::MemoryKeyValueStore`].
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value for a key (upsert).
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. No-op if the key does not exist.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
