//! RemoteSessionGateway trait definition.
//!
//! Every operation fails soft: transport and server errors are logged by
//! the implementation and come back as an empty list or `false`. Callers
//! never see an error type from this boundary, so the client keeps working
//! fully offline.

use chrono::{DateTime, Utc};
use echochat_types::chat::ChatSession;
use echochat_types::identity::DeviceId;

/// Trait for the remote session store, scoped by device id.
///
/// Implementations live in echochat-infra (e.g., `HttpSessionGateway`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait RemoteSessionGateway: Send + Sync {
    /// Whether a remote endpoint is configured. When false, every call
    /// returns immediately without network I/O.
    fn is_configured(&self) -> bool;

    /// Instant of the last successful exchange with the remote store.
    fn last_synced(&self) -> Option<DateTime<Utc>>;

    /// All sessions stored remotely for `device_id`. Empty on any failure.
    fn fetch_all(
        &self,
        device_id: &DeviceId,
    ) -> impl std::future::Future<Output = Vec<ChatSession>> + Send;

    /// Create or replace a session remotely. `false` on any failure.
    fn upsert(
        &self,
        session: &ChatSession,
        device_id: &DeviceId,
    ) -> impl std::future::Future<Output = bool> + Send;

    /// Delete a session remotely. `false` on any failure.
    fn delete(
        &self,
        session_id: &str,
        device_id: &DeviceId,
    ) -> impl std::future::Future<Output = bool> + Send;
}

/// Gateway for clients with no remote endpoint configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGateway;

impl RemoteSessionGateway for DisabledGateway {
    fn is_configured(&self) -> bool {
        false
    }

    fn last_synced(&self) -> Option<DateTime<Utc>> {
        None
    }

    async fn fetch_all(&self, _device_id: &DeviceId) -> Vec<ChatSession> {
        Vec::new()
    }

    async fn upsert(&self, _session: &ChatSession, _device_id: &DeviceId) -> bool {
        false
    }

    async fn delete(&self, _session_id: &str, _device_id: &DeviceId) -> bool {
        false
    }
}
