//! SessionSynchronizer: the single owner of local and remote session writes.
//!
//! Reads merge both stores by session id, inserting local sessions first
//! and then remote ones, so the remote copy replaces the local one on an id
//! collision regardless of which has the newer `updated_at`. That is the
//! observable behavior of the remote store contract; it is kept as-is and
//! exercised by `test_remote_wins_even_when_older`.
//!
//! Writes go to the local store first and are then mirrored remotely in the
//! background. A remote failure never rolls back or fails a local write.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use echochat_types::chat::{ChatSession, Message};
use echochat_types::config::SyncConfig;
use echochat_types::error::StoreError;
use echochat_types::identity::DeviceId;
use echochat_types::sync::SyncStatus;
use tracing::{debug, info, warn};

use super::mirror::MirrorPool;
use super::observer::{NoopObserver, SyncObserver};
use crate::identity::IdentityProvider;
use crate::remote::gateway::RemoteSessionGateway;
use crate::session::local_store::LocalSessionStore;
use crate::storage::kv_store::KeyValueStore;

/// Upper bound on a remote fetch, independent of the gateway's own timeout.
const FETCH_DEADLINE: Duration = Duration::from_secs(30);

/// Merge local and remote collections; remote replaces local on id collision.
///
/// Output order: local sessions in stored order (with remote content
/// substituted in place), followed by remote-only sessions in remote order.
pub fn merge_sessions(local: Vec<ChatSession>, remote: Vec<ChatSession>) -> Vec<ChatSession> {
    let mut merged = local;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.clone(), i))
        .collect();

    for session in remote {
        match index.get(&session.id) {
            Some(&i) => merged[i] = session,
            None => {
                index.insert(session.id.clone(), merged.len());
                merged.push(session);
            }
        }
    }

    merged
}

/// Merges and persists chat sessions across the local and remote stores.
pub struct SessionSynchronizer<K: KeyValueStore, G: RemoteSessionGateway + 'static> {
    local: LocalSessionStore<K>,
    identity: IdentityProvider<K>,
    gateway: Arc<G>,
    mirrors: MirrorPool<G>,
}

impl<K: KeyValueStore, G: RemoteSessionGateway + 'static> SessionSynchronizer<K, G> {
    /// Create a synchronizer whose mirror outcomes are only logged.
    pub fn new(store: Arc<K>, gateway: G, config: &SyncConfig) -> Self {
        Self::with_observer(store, gateway, config, Arc::new(NoopObserver))
    }

    /// Create a synchronizer reporting every mirror outcome to `observer`.
    pub fn with_observer(
        store: Arc<K>,
        gateway: G,
        config: &SyncConfig,
        observer: Arc<dyn SyncObserver>,
    ) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            local: LocalSessionStore::new(store.clone()),
            identity: IdentityProvider::new(store),
            mirrors: MirrorPool::new(gateway.clone(), config.max_concurrent_mirrors, observer),
            gateway,
        }
    }

    /// This device's identity, generated on first use.
    pub fn device_id(&self) -> DeviceId {
        self.identity.device_id()
    }

    /// Whether writes are mirrored anywhere.
    pub fn is_remote_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    async fn fetch_remote(&self) -> Vec<ChatSession> {
        if !self.gateway.is_configured() {
            return Vec::new();
        }
        let device_id = self.device_id();
        match tokio::time::timeout(FETCH_DEADLINE, self.gateway.fetch_all(&device_id)).await {
            Ok(sessions) => sessions,
            Err(_) => {
                warn!(device_id = %device_id, "Remote session fetch timed out, using local sessions only");
                Vec::new()
            }
        }
    }

    /// The merged view of local and remote sessions.
    ///
    /// Falls back to local sessions only when the remote is absent or fails.
    #[tracing::instrument(name = "list_sessions", skip(self))]
    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        let local = self.local.list();
        let remote = self.fetch_remote().await;
        debug!(local = local.len(), remote = remote.len(), "Merging sessions");
        merge_sessions(local, remote)
    }

    /// A session from the merged view.
    pub async fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.list_sessions()
            .await
            .into_iter()
            .find(|s| s.id == session_id)
    }

    /// Persist a session locally, then mirror it remotely in the background.
    ///
    /// Only a failed local write is an error.
    #[tracing::instrument(name = "save_session", skip(self, session), fields(session_id = %session.id))]
    pub async fn save_session(&self, session: ChatSession) -> Result<ChatSession, StoreError> {
        let stored = self.local.save(session)?;
        self.mirror_upsert(&stored);
        Ok(stored)
    }

    /// Persist many sessions: every local write completes before any remote
    /// mirror is scheduled, and the mirrors then run concurrently.
    #[tracing::instrument(name = "save_all", skip(self, sessions), fields(count = sessions.len()))]
    pub async fn save_all(&self, sessions: Vec<ChatSession>) -> Result<Vec<ChatSession>, StoreError> {
        let mut stored = Vec::with_capacity(sessions.len());
        for session in sessions {
            stored.push(self.local.save(session)?);
        }
        for session in &stored {
            self.mirror_upsert(session);
        }
        Ok(stored)
    }

    /// Append a message locally, then mirror the updated session.
    ///
    /// A session known only remotely is cached locally first; a session
    /// unknown to both stores fails with [`StoreError::NotFound`].
    #[tracing::instrument(name = "append_message", skip(self, message), fields(session_id = %session_id))]
    pub async fn append_message(
        &self,
        session_id: &str,
        message: Message,
    ) -> Result<ChatSession, StoreError> {
        if self.local.get(session_id).is_none() {
            let remote = self
                .fetch_remote()
                .await
                .into_iter()
                .find(|s| s.id == session_id)
                .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
            info!(session_id = %session_id, "Caching remote-only session locally before append");
            self.local.cache(remote)?;
        }

        let updated = self.local.append_message(session_id, message)?;
        self.mirror_upsert(&updated);
        Ok(updated)
    }

    /// Delete locally (always succeeds, idempotent), then remotely in the background.
    #[tracing::instrument(name = "delete_session", skip(self))]
    pub async fn delete_session(&self, session_id: &str) {
        self.local.delete(session_id);
        if self.gateway.is_configured() {
            self.mirrors
                .schedule_delete(session_id.to_string(), self.device_id());
        }
    }

    /// Drop the local cache. Remote copies are untouched and reappear on
    /// the next merge.
    pub fn clear_local(&self) -> Result<(), StoreError> {
        self.local.clear_all()
    }

    /// Wait for every outstanding background mirror.
    pub async fn flush(&self) {
        self.mirrors.flush().await;
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            remote_configured: self.gateway.is_configured(),
            last_synced: self.gateway.last_synced(),
            pending_mirrors: self.mirrors.pending(),
        }
    }

    fn mirror_upsert(&self, session: &ChatSession) {
        if self.gateway.is_configured() {
            self.mirrors.schedule_upsert(session.clone(), self.device_id());
        }
    }
}
