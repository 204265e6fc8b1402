//! Anonymous device identity.
//!
//! The identity is generated once per local store and then read back on
//! every later run. It scopes this device's sessions on the remote store
//! and is never treated as a credential. A failed read yields an id for
//! the current run only; the stored id is left as it is.

use std::sync::{Arc, OnceLock};

use echochat_types::identity::DeviceId;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::storage::kv_store::{DEVICE_ID_KEY, KeyValueStore};

/// Produces and persists the device identity.
pub struct IdentityProvider<K: KeyValueStore> {
    store: Arc<K>,
    cached: OnceLock<DeviceId>,
}

impl<K: KeyValueStore> IdentityProvider<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self {
            store,
            cached: OnceLock::new(),
        }
    }

    /// The device id, generated and persisted on first access.
    pub fn device_id(&self) -> DeviceId {
        self.cached.get_or_init(|| self.load_or_create()).clone()
    }

    fn load_or_create(&self) -> DeviceId {
        match self.store.get(DEVICE_ID_KEY) {
            Ok(Some(existing)) if !existing.trim().is_empty() => {
                return DeviceId::new(existing.trim());
            }
            Ok(_) => {}
            Err(e) => {
                // The stored id may still exist; never overwrite it.
                let id = DeviceId::new(Uuid::new_v4().to_string());
                warn!(error = %e, device_id = %id, "Failed to read device id, using one for this run only");
                return id;
            }
        }

        let id = DeviceId::new(Uuid::new_v4().to_string());
        match self.store.set(DEVICE_ID_KEY, id.as_str()) {
            Ok(()) => info!(device_id = %id, "Generated new device id"),
            Err(e) => error!(error = %e, "Failed to persist device id; it will change next run"),
        }
        id
    }
}
