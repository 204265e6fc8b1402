//! Sync status and background mirror outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which remote write a background mirror performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorOp {
    Upsert,
    Delete,
}

impl fmt::Display for MirrorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorOp::Upsert => write!(f, "upsert"),
            MirrorOp::Delete => write!(f, "delete"),
        }
    }
}

/// How a background mirror ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorResult {
    /// The remote accepted the write.
    Synced,
    /// The remote rejected the write or could not be reached.
    Failed,
    /// A newer write for the same session was scheduled first; nothing sent.
    Superseded,
}

/// Completion report for one background mirror task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorOutcome {
    pub session_id: String,
    pub op: MirrorOp,
    pub result: MirrorResult,
}

/// Snapshot of the synchronizer's view of the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Whether a remote endpoint is configured at all.
    pub remote_configured: bool,
    /// Last successful exchange with the remote store.
    pub last_synced: Option<DateTime<Utc>>,
    /// Background mirrors scheduled but not yet finished.
    pub pending_mirrors: usize,
}

impl SyncStatus {
    /// Human rendering of `last_synced` relative to `now`.
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(last) = self.last_synced else {
            return "Never synced".to_string();
        };
        let seconds = (now - last).num_seconds().max(0);
        if seconds < 60 {
            "Just now".to_string()
        } else if seconds < 3_600 {
            format!("{} minutes ago", seconds / 60)
        } else if seconds < 86_400 {
            format!("{} hours ago", seconds / 3_600)
        } else {
            format!("{} days ago", seconds / 86_400)
        }
    }
}
