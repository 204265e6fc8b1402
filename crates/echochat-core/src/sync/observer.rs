//! Completion callback for background mirrors.

use echochat_types::sync::MirrorOutcome;

/// Receives one [`MirrorOutcome`] per finished background mirror.
///
/// Called from the mirror task itself, so implementations must be cheap
/// and must not block.
pub trait SyncObserver: Send + Sync {
    fn on_mirror(&self, outcome: &MirrorOutcome);
}

impl<F> SyncObserver for F
where
    F: Fn(&MirrorOutcome) + Send + Sync,
{
    fn on_mirror(&self, outcome: &MirrorOutcome) {
        self(outcome)
    }
}

/// Observer that ignores every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn on_mirror(&self, _outcome: &MirrorOutcome) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use echochat_types::sync::{MirrorOp, MirrorResult};
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |outcome: &MirrorOutcome| seen.lock().unwrap().push(outcome.clone());
        observer.on_mirror(&MirrorOutcome {
            session_id: "s".to_string(),
            op: MirrorOp::Delete,
            result: MirrorResult::Synced,
        });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
