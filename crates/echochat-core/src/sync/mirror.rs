//! Background mirroring of local writes to the remote session store.
//!
//! Each remote write runs as its own tokio task, tracked so callers can
//! wait for quiescence (`flush`) and bounded by a semaphore so a bulk save
//! of many sessions cannot open unbounded connections.
//!
//! Mirrors of the same session run one at a time, in lock order. Every
//! scheduled write bumps a per-session generation, and a task that takes
//! the session lock after a newer write was scheduled sends nothing and
//! reports `Superseded`. A stale snapshot therefore never lands after a
//! newer one, and a queued upsert never resurrects a deleted session.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use echochat_types::chat::ChatSession;
use echochat_types::identity::DeviceId;
use echochat_types::sync::{MirrorOp, MirrorOutcome, MirrorResult};
use tokio::sync::{Mutex, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::observer::SyncObserver;
use crate::remote::gateway::RemoteSessionGateway;

/// Bounded, tracked pool of remote mirror tasks.
pub struct MirrorPool<G: RemoteSessionGateway + 'static> {
    gateway: Arc<G>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    generations: Arc<DashMap<String, u64>>,
    session_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    observer: Arc<dyn SyncObserver>,
}

impl<G: RemoteSessionGateway + 'static> MirrorPool<G> {
    pub fn new(gateway: Arc<G>, max_concurrent: usize, observer: Arc<dyn SyncObserver>) -> Self {
        let tracker = TaskTracker::new();
        // Closing only changes `wait()` semantics: spawning stays allowed and
        // `wait()` resolves whenever no tracked task is running.
        tracker.close();

        Self {
            gateway,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tracker,
            generations: Arc::new(DashMap::new()),
            session_locks: Arc::new(DashMap::new()),
            observer,
        }
    }

    /// Mirror the full session to the remote store.
    pub fn schedule_upsert(&self, session: ChatSession, device_id: DeviceId) {
        let session_id = session.id.clone();
        self.schedule(session_id, MirrorOp::Upsert, move |gateway| async move {
            gateway.upsert(&session, &device_id).await
        });
    }

    /// Mirror a deletion to the remote store.
    pub fn schedule_delete(&self, session_id: String, device_id: DeviceId) {
        let target = session_id.clone();
        self.schedule(session_id, MirrorOp::Delete, move |gateway| async move {
            gateway.delete(&target, &device_id).await
        });
    }

    /// Number of mirrors scheduled and not yet finished.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every scheduled mirror has finished.
    pub async fn flush(&self) {
        self.tracker.wait().await;
    }

    fn next_generation(&self, session_id: &str) -> u64 {
        let mut entry = self.generations.entry(session_id.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn schedule<F, Fut>(&self, session_id: String, op: MirrorOp, work: F)
    where
        F: FnOnce(Arc<G>) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let generation = self.next_generation(&session_id);
        let session_lock = self.session_lock(&session_id);
        let gateway = self.gateway.clone();
        let permits = self.permits.clone();
        let generations = self.generations.clone();
        let session_locks = self.session_locks.clone();
        let observer = self.observer.clone();

        self.tracker.spawn(async move {
            // Session lock before permit, so waiting tasks hold no permit.
            let guard = session_lock.clone().lock_owned().await;
            let result = match permits.acquire_owned().await {
                Err(_) => MirrorResult::Failed,
                Ok(_permit) => {
                    let latest = generations.get(&session_id).map(|g| *g);
                    if latest != Some(generation) {
                        MirrorResult::Superseded
                    } else if work(gateway).await {
                        MirrorResult::Synced
                    } else {
                        MirrorResult::Failed
                    }
                }
            };
            drop(guard);

            generations.remove_if(&session_id, |_, g| *g == generation);
            drop(session_lock);
            session_locks.remove_if(&session_id, |_, lock| Arc::strong_count(lock) == 1);

            match result {
                MirrorResult::Failed => {
                    warn!(session_id = %session_id, op = %op, "Remote mirror failed; local copy remains authoritative")
                }
                _ => debug!(session_id = %session_id, op = %op, result = ?result, "Remote mirror finished"),
            }

            observer.on_mirror(&MirrorOutcome {
                session_id,
                op,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryGateway;
    use echochat_types::chat::Message;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn pool(
        gateway: &MemoryGateway,
        max_concurrent: usize,
    ) -> (MirrorPool<MemoryGateway>, Arc<StdMutex<Vec<MirrorOutcome>>>) {
        let outcomes = Arc::new(StdMutex::new(Vec::new()));
        let sink = outcomes.clone();
        let pool = MirrorPool::new(
            Arc::new(gateway.clone()),
            max_concurrent,
            Arc::new(move |o: &MirrorOutcome| sink.lock().unwrap().push(o.clone())),
        );
        (pool, outcomes)
    }

    #[tokio::test]
    async fn test_slow_older_upsert_cannot_land_last() {
        let gateway = MemoryGateway::new();
        gateway.delay_first_upsert(Duration::from_millis(200));
        let (pool, outcomes) = pool(&gateway, 4);
        let device = DeviceId::new("device-1");

        let empty = ChatSession::new("llama3");
        pool.schedule_upsert(empty.clone(), device.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut with_message = empty.clone();
        with_message.messages.push(Message::user("hi"));
        pool.schedule_upsert(with_message, device.clone());
        pool.flush().await;

        let remote = gateway.sessions(&device);
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].messages.len(), 1);
        assert_eq!(gateway.upserts(), 2);
        assert!(outcomes.lock().unwrap().iter().all(|o| o.result == MirrorResult::Synced));
    }

    #[tokio::test]
    async fn test_session_state_is_released_after_flush() {
        let gateway = MemoryGateway::new();
        let (pool, _) = pool(&gateway, 2);
        let device = DeviceId::new("device-1");

        for _ in 0..3 {
            pool.schedule_upsert(ChatSession::new("llama3"), device.clone());
        }
        let session = ChatSession::new("llama3");
        pool.schedule_upsert(session.clone(), device.clone());
        pool.schedule_delete(session.id.clone(), device.clone());
        pool.flush().await;

        assert_eq!(pool.pending(), 0);
        assert!(pool.generations.is_empty());
        assert!(pool.session_locks.is_empty());
        assert_eq!(gateway.sessions(&device).len(), 3);
    }
}
