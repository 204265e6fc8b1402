//! In-memory test doubles shared by the core test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use echochat_types::chat::ChatSession;
use echochat_types::error::StoreError;
use echochat_types::identity::DeviceId;

use crate::remote::gateway::RemoteSessionGateway;
use crate::storage::kv_store::KeyValueStore;
use crate::storage::memory::MemoryKeyValueStore;

#[derive(Default)]
struct Inner {
    sessions: Mutex<HashMap<String, Vec<ChatSession>>>,
    last_synced: Mutex<Option<DateTime<Utc>>>,
    failing: AtomicBool,
    unconfigured: AtomicBool,
    calls: AtomicUsize,
    upserts: AtomicUsize,
    first_upsert_delay: Mutex<Option<Duration>>,
}

/// Remote gateway keeping sessions per device in memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway reporting no configured endpoint.
    pub fn unconfigured() -> Self {
        let gateway = Self::default();
        gateway.inner.unconfigured.store(true, Ordering::SeqCst);
        gateway
    }

    /// Make every subsequent call fail soft.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold the next upsert for `delay` after it has captured its snapshot.
    pub fn delay_first_upsert(&self, delay: Duration) {
        *self.inner.first_upsert_delay.lock().unwrap() = Some(delay);
    }

    /// Insert or replace a session directly, bypassing call accounting.
    pub fn put(&self, device_id: &DeviceId, session: ChatSession) {
        let mut all = self.inner.sessions.lock().unwrap();
        let list = all.entry(device_id.as_str().to_string()).or_default();
        match list.iter().position(|s| s.id == session.id) {
            Some(i) => list[i] = session,
            None => list.push(session),
        }
    }

    pub fn sessions(&self, device_id: &DeviceId) -> Vec<ChatSession> {
        self.inner
            .sessions
            .lock()
            .unwrap()
            .get(device_id.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Total fetch/upsert/delete calls received.
    pub fn network_calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Upserts that reached the store.
    pub fn upserts(&self) -> usize {
        self.inner.upserts.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> bool {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        !self.inner.failing.load(Ordering::SeqCst)
    }

    fn mark_synced(&self) {
        *self.inner.last_synced.lock().unwrap() = Some(Utc::now());
    }
}

impl RemoteSessionGateway for MemoryGateway {
    fn is_configured(&self) -> bool {
        !self.inner.unconfigured.load(Ordering::SeqCst)
    }

    fn last_synced(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_synced.lock().unwrap()
    }

    async fn fetch_all(&self, device_id: &DeviceId) -> Vec<ChatSession> {
        if !self.begin_call() {
            return Vec::new();
        }
        self.mark_synced();
        self.sessions(device_id)
    }

    async fn upsert(&self, session: &ChatSession, device_id: &DeviceId) -> bool {
        if !self.begin_call() {
            return false;
        }
        let snapshot = session.clone();
        let delay = self.inner.first_upsert_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.upserts.fetch_add(1, Ordering::SeqCst);
        self.put(device_id, snapshot);
        self.mark_synced();
        true
    }

    async fn delete(&self, session_id: &str, device_id: &DeviceId) -> bool {
        if !self.begin_call() {
            return false;
        }
        if let Some(list) = self.inner.sessions.lock().unwrap().get_mut(device_id.as_str()) {
            list.retain(|s| s.id != session_id);
        }
        self.mark_synced();
        true
    }
}

/// Key-value store whose next reads fail with a backend error.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing_reads: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let failed = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Backend("transient read failure".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}
