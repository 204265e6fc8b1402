//! Application state wiring all services together.
//!
//! The core services are generic over store, gateway and inference traits;
//! AppState pins them to the concrete infra implementations chosen from
//! configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use echochat_core::chat::controller::ChatController;
use echochat_core::llm::box_client::BoxInferenceClient;
use echochat_core::storage::kv_store::KeyValueStore;
use echochat_core::storage::memory::MemoryKeyValueStore;
use echochat_core::sync::observer::SyncObserver;
use echochat_core::sync::synchronizer::SessionSynchronizer;
use echochat_infra::config::{load_client_config, resolve_data_dir};
use echochat_infra::llm::create_inference_client;
use echochat_infra::remote::http_gateway::HttpSessionGateway;
use echochat_infra::storage::file_store::FileKeyValueStore;
use echochat_types::config::ClientConfig;
use echochat_types::error::StoreError;
use echochat_types::sync::{MirrorOutcome, MirrorResult};

/// Key-value backend selected at startup.
pub enum AppStore {
    File(FileKeyValueStore),
    /// `--ephemeral`: nothing touches the disk.
    Memory(MemoryKeyValueStore),
}

impl KeyValueStore for AppStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            AppStore::File(store) => store.get(key),
            AppStore::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            AppStore::File(store) => store.set(key, value),
            AppStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            AppStore::File(store) => store.remove(key),
            AppStore::Memory(store) => store.remove(key),
        }
    }
}

/// Counts background mirrors that failed during this run.
#[derive(Default)]
pub struct MirrorFailures(AtomicUsize);

impl MirrorFailures {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl SyncObserver for MirrorFailures {
    fn on_mirror(&self, outcome: &MirrorOutcome) {
        if outcome.result == MirrorResult::Failed {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}

pub type ConcreteSynchronizer = SessionSynchronizer<AppStore, HttpSessionGateway>;

pub type ConcreteController = ChatController<AppStore, HttpSessionGateway, BoxInferenceClient>;

/// Everything a command needs.
pub struct AppState {
    pub controller: ConcreteController,
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub ephemeral: bool,
    pub mirror_failures: Arc<MirrorFailures>,
}

impl AppState {
    /// Resolve the data directory, load configuration and wire services.
    pub async fn init(data_dir: Option<&Path>, ephemeral: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir(data_dir);
        let config = load_client_config(&data_dir).await;
        tracing::debug!(data_dir = %data_dir.display(), ?config, "Loaded configuration");

        let store = if ephemeral {
            AppStore::Memory(MemoryKeyValueStore::new())
        } else {
            tokio::fs::create_dir_all(&data_dir).await?;
            AppStore::File(FileKeyValueStore::in_data_dir(&data_dir))
        };

        let gateway = HttpSessionGateway::from_config(&config.remote)?;
        let inference = create_inference_client(&config.inference)?;

        let mirror_failures = Arc::new(MirrorFailures::default());
        let sync = SessionSynchronizer::with_observer(
            Arc::new(store),
            gateway,
            &config.sync,
            mirror_failures.clone(),
        );
        let controller =
            ChatController::new(sync, inference).with_default_model(&config.default_model);

        Ok(Self {
            controller,
            config,
            data_dir,
            ephemeral,
            mirror_failures,
        })
    }

    pub fn sync(&self) -> &ConcreteSynchronizer {
        self.controller.synchronizer()
    }

    /// Wait for background mirrors and report failures.
    pub async fn shutdown(&self, quiet: bool) {
        self.sync().flush().await;
        let failed = self.mirror_failures.count();
        if failed > 0 && !quiet {
            eprintln!(
                "  {} {failed} remote sync operation{} failed; local copies are intact.",
                console::style("!").yellow().bold(),
                if failed == 1 { "" } else { "s" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echochat_core::llm::client::InferenceClient;
    use echochat_types::sync::MirrorOp;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_defaults_to_local_only() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::init(Some(tmp.path()), false).await.unwrap();
        assert!(!state.sync().is_remote_configured());
        assert_eq!(state.controller.inference().name(), "simulated");
        assert_eq!(state.controller.default_model(), "llama3");
        assert_eq!(state.data_dir, tmp.path());
    }

    #[tokio::test]
    async fn test_ephemeral_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut state = AppState::init(Some(tmp.path()), true).await.unwrap();
        state.controller.initialize().await.unwrap();
        state.controller.send_message("hello").await.unwrap();
        assert!(!tmp.path().join("store").exists());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_runs() {
        let tmp = TempDir::new().unwrap();
        let first_id = {
            let mut state = AppState::init(Some(tmp.path()), false).await.unwrap();
            state.controller.initialize().await.unwrap();
            state.controller.send_message("remember me").await.unwrap().id
        };

        let mut state = AppState::init(Some(tmp.path()), false).await.unwrap();
        state.controller.initialize().await.unwrap();
        assert_eq!(state.controller.active_session_id(), Some(first_id.as_str()));
        assert_eq!(state.controller.active_session().unwrap().title, "remember me");
    }

    #[test]
    fn test_mirror_failures_counts_only_failures() {
        let failures = MirrorFailures::default();
        for result in [MirrorResult::Synced, MirrorResult::Failed, MirrorResult::Superseded] {
            failures.on_mirror(&MirrorOutcome {
                session_id: "s".to_string(),
                op: MirrorOp::Upsert,
                result,
            });
        }
        assert_eq!(failures.count(), 1);
    }
}
