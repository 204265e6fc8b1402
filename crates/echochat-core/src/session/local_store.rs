//! Durable cache of every chat session on this device.
//!
//! All sessions live as one JSON array under [`SESSIONS_KEY`]. Reads never
//! fail: an unreadable or unparsable value is logged and treated as an
//! empty collection. Writes are stricter. A backend read error aborts the
//! write so a transient failure cannot replace the stored collection, and
//! before a write replaces an unparsable value, the raw text is copied to
//! [`CORRUPT_BACKUP_KEY`] so it can be inspected later.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use echochat_types::chat::{ChatSession, Message};
use echochat_types::error::StoreError;
use tracing::{debug, error, warn};

use crate::storage::kv_store::{KeyValueStore, SESSIONS_KEY};

/// Key receiving the raw text of a sessions value that failed to parse.
pub const CORRUPT_BACKUP_KEY: &str = "echo-chat-sessions.corrupt";

/// Local session store over a [`KeyValueStore`].
///
/// Read-modify-write sequences hold an internal lock so concurrent callers
/// cannot drop each other's updates.
pub struct LocalSessionStore<K: KeyValueStore> {
    store: Arc<K>,
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore> LocalSessionStore<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives in the backend, so a poisoned lock is safe to reuse.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the collection for reading. Any failure reads as empty.
    fn load(&self) -> Vec<ChatSession> {
        match self.store.get(SESSIONS_KEY) {
            Ok(Some(raw)) => Self::parse(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, "Failed to read chat sessions, treating as empty");
                Vec::new()
            }
        }
    }

    /// Load the collection ahead of a write.
    ///
    /// A backend read error is returned so the caller does not persist over
    /// data it never saw. A value that fails to parse is copied aside and
    /// then treated as empty.
    fn load_for_write(&self) -> Result<Vec<ChatSession>, StoreError> {
        let raw = match self.store.get(SESSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                error!(error = %e, "Failed to read chat sessions, write aborted");
                return Err(e);
            }
        };

        match Self::parse(&raw) {
            Some(sessions) => Ok(sessions),
            None => {
                if let Err(e) = self.store.set(CORRUPT_BACKUP_KEY, &raw) {
                    error!(error = %e, "Failed to back up corrupt chat sessions");
                }
                Ok(Vec::new())
            }
        }
    }

    fn parse(raw: &str) -> Option<Vec<ChatSession>> {
        match serde_json::from_str::<Vec<ChatSession>>(raw) {
            Ok(sessions) => Some(sessions),
            Err(e) => {
                warn!(error = %e, "Stored chat sessions are corrupt, treating as empty");
                None
            }
        }
    }

    fn persist(&self, sessions: &[ChatSession]) -> Result<(), StoreError> {
        let json = serde_json::to_string(sessions)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(SESSIONS_KEY, &json).map_err(|e| {
            error!(error = %e, "Failed to save chat sessions");
            e
        })
    }

    /// All locally cached sessions, in stored order.
    pub fn list(&self) -> Vec<ChatSession> {
        self.load()
    }

    /// A single session by id.
    pub fn get(&self, session_id: &str) -> Option<ChatSession> {
        self.load().into_iter().find(|s| s.id == session_id)
    }

    /// Insert or replace a session by id and return the stored copy.
    ///
    /// A first insert stamps `created_at` and `updated_at` with the same
    /// instant. An update keeps the incoming `created_at` and refreshes
    /// `updated_at`.
    pub fn save(&self, session: ChatSession) -> Result<ChatSession, StoreError> {
        let _guard = self.lock();
        let mut sessions = self.load_for_write()?;
        let now = Utc::now();
        let mut stored = session;

        match sessions.iter().position(|s| s.id == stored.id) {
            Some(index) => {
                stored.updated_at = now.max(stored.created_at);
                sessions[index] = stored.clone();
            }
            None => {
                stored.created_at = now;
                stored.updated_at = now;
                sessions.push(stored.clone());
            }
        }

        self.persist(&sessions)?;
        debug!(session_id = %stored.id, "Saved chat session locally");
        Ok(stored)
    }

    /// Insert or replace a session exactly as given, timestamps included.
    ///
    /// Used to materialize a remote-only session before a local mutation.
    pub(crate) fn cache(&self, session: ChatSession) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut sessions = self.load_for_write()?;
        match sessions.iter().position(|s| s.id == session.id) {
            Some(index) => sessions[index] = session,
            None => sessions.push(session),
        }
        self.persist(&sessions)
    }

    /// Remove a session. Removing an unknown id is a no-op, and so is a
    /// removal whose read fails.
    pub fn delete(&self, session_id: &str) {
        let _guard = self.lock();
        let Ok(mut sessions) = self.load_for_write() else {
            return;
        };
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        if sessions.len() == before {
            debug!(session_id = %session_id, "Delete of unknown session ignored");
            return;
        }
        // persist() already logs; deletion stays infallible for callers.
        let _ = self.persist(&sessions);
    }

    /// Append `message` to the end of a session's history.
    ///
    /// Fails with [`StoreError::NotFound`] when the session is not cached
    /// locally.
    pub fn append_message(
        &self,
        session_id: &str,
        message: Message,
    ) -> Result<ChatSession, StoreError> {
        let _guard = self.lock();
        let mut sessions = self.load_for_write()?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;

        session.messages.push(message);
        session.updated_at = Utc::now().max(session.created_at);
        let updated = session.clone();

        self.persist(&sessions)?;
        Ok(updated)
    }

    /// Drop every locally cached session.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.persist(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryKeyValueStore;
    use crate::testing::FlakyStore;
    use chrono::Duration;

    fn store() -> (Arc<MemoryKeyValueStore>, LocalSessionStore<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (kv.clone(), LocalSessionStore::new(kv))
    }

    #[test]
    fn test_list_empty_store() {
        let (_, local) = store();
        assert!(local.list().is_empty());
    }

    #[test]
    fn test_save_first_insert_sets_both_timestamps() {
        let (_, local) = store();
        let mut session = ChatSession::new("llama3");
        session.created_at = Utc::now() - Duration::days(10);

        let stored = local.save(session.clone()).unwrap();
        assert_eq!(stored.created_at, stored.updated_at);
        assert!(stored.created_at > session.created_at);
        assert_eq!(local.list().len(), 1);
    }

    #[test]
    fn test_save_update_refreshes_updated_at_only() {
        let (_, local) = store();
        let first = local.save(ChatSession::new("llama3")).unwrap();

        let mut renamed = first.clone();
        renamed.title = "Renamed".to_string();
        let second = local.save(renamed).unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(local.list().len(), 1);
        assert_eq!(local.get(&first.id).unwrap().title, "Renamed");
    }

    #[test]
    fn test_append_message_keeps_prefix() {
        let (_, local) = store();
        let session = local.save(ChatSession::new("llama3")).unwrap();
        let one = local.append_message(&session.id, Message::user("one")).unwrap();
        let two = local.append_message(&session.id, Message::user("two")).unwrap();

        assert_eq!(two.messages.len(), one.messages.len() + 1);
        assert_eq!(&two.messages[..1], &one.messages[..]);
        assert_eq!(two.messages[1].content, "two");
        assert!(two.updated_at >= two.created_at);
    }

    #[test]
    fn test_append_message_unknown_session() {
        let (_, local) = store();
        let err = local.append_message("missing", Message::user("x")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_, local) = store();
        let session = local.save(ChatSession::new("llama3")).unwrap();
        local.delete("does-not-exist");
        assert_eq!(local.list().len(), 1);
        local.delete(&session.id);
        local.delete(&session.id);
        assert!(local.list().is_empty());
    }

    #[test]
    fn test_corrupt_store_reads_as_empty_and_is_backed_up_on_write() {
        let (kv, local) = store();
        kv.set(SESSIONS_KEY, "{not json").unwrap();

        assert!(local.list().is_empty());
        assert!(local.get("anything").is_none());
        // reads alone leave the corrupt value untouched
        assert_eq!(kv.get(CORRUPT_BACKUP_KEY).unwrap(), None);

        let stored = local.save(ChatSession::new("llama3")).unwrap();
        assert_eq!(local.list(), vec![stored]);
        assert_eq!(kv.get(CORRUPT_BACKUP_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_cache_keeps_timestamps() {
        let (_, local) = store();
        let mut session = ChatSession::new("mistral");
        session.created_at = Utc::now() - Duration::days(3);
        session.updated_at = session.created_at + Duration::hours(1);

        local.cache(session.clone()).unwrap();
        assert_eq!(local.get(&session.id), Some(session));
    }

    #[test]
    fn test_clear_all() {
        let (_, local) = store();
        local.save(ChatSession::new("llama3")).unwrap();
        local.save(ChatSession::new("mistral")).unwrap();
        local.clear_all().unwrap();
        assert!(local.list().is_empty());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk unplugged".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk unplugged".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_transient_read_error_does_not_overwrite_sessions() {
        let kv = Arc::new(FlakyStore::new());
        let local = LocalSessionStore::new(kv.clone());
        let mut saved = Vec::new();
        for _ in 0..3 {
            saved.push(local.save(ChatSession::new("llama3")).unwrap());
        }

        kv.fail_next_reads(1);
        assert!(matches!(
            local.save(ChatSession::new("mistral")),
            Err(StoreError::Backend(_))
        ));
        assert_eq!(local.list().len(), 3);

        kv.fail_next_reads(1);
        assert!(local.append_message(&saved[0].id, Message::user("hi")).is_err());
        kv.fail_next_reads(1);
        assert!(local.cache(ChatSession::new("mistral")).is_err());
        kv.fail_next_reads(1);
        local.delete(&saved[1].id);
        assert_eq!(local.list().len(), 3);
        assert_eq!(kv.get(CORRUPT_BACKUP_KEY).unwrap(), None);

        local.save(ChatSession::new("mistral")).unwrap();
        assert_eq!(local.list().len(), 4);
    }

    #[test]
    fn test_backend_failures() {
        let local = LocalSessionStore::new(Arc::new(FailingStore));
        assert!(local.list().is_empty());
        local.delete("anything");
        assert!(matches!(
            local.save(ChatSession::new("llama3")),
            Err(StoreError::Backend(_))
        ));
    }
}
