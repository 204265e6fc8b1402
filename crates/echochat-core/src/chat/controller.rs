//! Chat session controller.
//!
//! Owns the in-memory view of the conversation list: which session is
//! active, the cached sessions, and whether a send is in flight. Every
//! mutation goes through the [`SessionSynchronizer`], so the cache only
//! ever mirrors what was persisted.

use echochat_types::chat::{ChatSession, Message};
use echochat_types::error::ChatError;
use echochat_types::llm::ChatRequest;
use tracing::{debug, info, warn};

use super::title::derive_title;
use crate::catalog;
use crate::llm::client::InferenceClient;
use crate::remote::gateway::RemoteSessionGateway;
use crate::storage::kv_store::KeyValueStore;
use crate::sync::synchronizer::SessionSynchronizer;

/// Lifecycle of a [`ChatController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created but `initialize` has not run.
    Uninitialized,
    /// Idle with an active session.
    Ready,
    /// A message exchange is in flight.
    Sending,
}

/// Single owner of the active session and the cached session list.
///
/// `send_message` takes `&mut self`, so at most one exchange can be in
/// flight per controller.
pub struct ChatController<K, G, P>
where
    K: KeyValueStore,
    G: RemoteSessionGateway + 'static,
    P: InferenceClient,
{
    sync: SessionSynchronizer<K, G>,
    inference: P,
    default_model: String,
    state: ControllerState,
    sessions: Vec<ChatSession>,
    active_id: Option<String>,
}

impl<K, G, P> ChatController<K, G, P>
where
    K: KeyValueStore,
    G: RemoteSessionGateway + 'static,
    P: InferenceClient,
{
    pub fn new(sync: SessionSynchronizer<K, G>, inference: P) -> Self {
        Self {
            sync,
            inference,
            default_model: catalog::default_model().id.clone(),
            state: ControllerState::Uninitialized,
            sessions: Vec::new(),
            active_id: None,
        }
    }

    /// Model assigned to sessions created by this controller.
    ///
    /// Unknown ids are ignored with a warning and the catalog default is kept.
    pub fn with_default_model(mut self, model_id: &str) -> Self {
        match catalog::model_by_id(model_id) {
            Some(model) => self.default_model = model.id.clone(),
            None => warn!(model_id = %model_id, "Unknown default model, keeping catalog default"),
        }
        self
    }

    // --- Accessors ---

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Cached sessions, newest-created first for sessions made here.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        let id = self.active_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn synchronizer(&self) -> &SessionSynchronizer<K, G> {
        &self.sync
    }

    pub fn inference(&self) -> &P {
        &self.inference
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    // --- Lifecycle ---

    /// Load the merged session list and select the most recently updated
    /// session, creating one when none exist.
    pub async fn initialize(&mut self) -> Result<(), ChatError> {
        self.sessions = self.sync.list_sessions().await;
        match most_recent(&self.sessions) {
            Some(id) => self.active_id = Some(id),
            None => {
                self.create_session().await?;
            }
        }
        self.state = ControllerState::Ready;
        info!(
            sessions = self.sessions.len(),
            active = ?self.active_id,
            "Chat controller initialized"
        );
        Ok(())
    }

    /// Reload the merged view, keeping the active session when it survived.
    pub async fn refresh(&mut self) -> Result<(), ChatError> {
        self.ensure_initialized()?;
        self.sessions = self.sync.list_sessions().await;

        let still_present = self
            .active_id
            .as_deref()
            .is_some_and(|id| self.sessions.iter().any(|s| s.id == id));
        if !still_present {
            self.reselect().await?;
        }
        Ok(())
    }

    /// Create, persist and activate an empty session.
    pub async fn new_session(&mut self) -> Result<ChatSession, ChatError> {
        self.ensure_initialized()?;
        self.create_session().await
    }

    /// Make `session_id` the active session.
    pub async fn select_session(&mut self, session_id: &str) -> Result<&ChatSession, ChatError> {
        self.ensure_initialized()?;

        if !self.sessions.iter().any(|s| s.id == session_id) {
            let session = self
                .sync
                .get_session(session_id)
                .await
                .ok_or_else(|| ChatError::UnknownSession(session_id.to_string()))?;
            self.sessions.push(session);
        }

        self.active_id = Some(session_id.to_string());
        debug!(session_id = %session_id, "Selected chat session");
        self.active_session()
            .ok_or_else(|| ChatError::UnknownSession(session_id.to_string()))
    }

    /// Delete a session. Deleting the active one selects the most recently
    /// updated remaining session, or creates a fresh one.
    pub async fn delete_session(&mut self, session_id: &str) -> Result<(), ChatError> {
        self.ensure_initialized()?;
        self.sync.delete_session(session_id).await;
        self.sessions.retain(|s| s.id != session_id);

        if self.active_id.as_deref() == Some(session_id) {
            self.reselect().await?;
        }
        Ok(())
    }

    /// Switch the active session to another catalog model.
    pub async fn set_model(&mut self, model_id: &str) -> Result<&ChatSession, ChatError> {
        self.ensure_initialized()?;
        let model = catalog::model_by_id(model_id)
            .ok_or_else(|| ChatError::UnknownModel(model_id.to_string()))?;
        let mut session = self
            .active_session()
            .cloned()
            .ok_or(ChatError::NoActiveSession)?;

        session.model_id = Some(model.id.clone());
        let stored = self.sync.save_session(session).await?;
        info!(session_id = %stored.id, model_id = %model.id, "Session model changed");
        let id = stored.id.clone();
        self.upsert_cached(stored);
        self.active_id = Some(id);
        self.active_session().ok_or(ChatError::NoActiveSession)
    }

    /// Send a user message in the active session and append the model's
    /// reply.
    ///
    /// The first message of a session also sets its title. The controller
    /// returns to `Ready` whether or not the exchange succeeded; on an
    /// inference failure the user message stays persisted.
    pub async fn send_message(&mut self, content: &str) -> Result<ChatSession, ChatError> {
        self.ensure_initialized()?;
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let session_id = self
            .active_id
            .clone()
            .ok_or(ChatError::NoActiveSession)?;

        self.state = ControllerState::Sending;
        let result = self.exchange(&session_id, content).await;
        self.state = ControllerState::Ready;

        if let Err(e) = &result {
            warn!(session_id = %session_id, error = %e, "Message exchange failed");
        }
        result
    }

    async fn exchange(&mut self, session_id: &str, content: &str) -> Result<ChatSession, ChatError> {
        let mut session = self
            .sync
            .append_message(session_id, Message::user(content))
            .await?;

        if session.messages.len() == 1 {
            session.title = derive_title(content);
            session = self.sync.save_session(session).await?;
            debug!(session_id = %session_id, title = %session.title, "Session titled from first message");
        }
        self.upsert_cached(session.clone());

        let model_id = session.effective_model_id().to_string();
        let request = ChatRequest::new(session.messages, model_id).with_session(session_id);
        let response = self.inference.complete(&request).await?;

        let updated = self
            .sync
            .append_message(session_id, response.message)
            .await?;
        self.upsert_cached(updated.clone());
        Ok(updated)
    }

    // --- Internals ---

    fn ensure_initialized(&self) -> Result<(), ChatError> {
        match self.state {
            ControllerState::Uninitialized => Err(ChatError::NotInitialized),
            _ => Ok(()),
        }
    }

    async fn create_session(&mut self) -> Result<ChatSession, ChatError> {
        let stored = self
            .sync
            .save_session(ChatSession::new(self.default_model.clone()))
            .await?;
        info!(session_id = %stored.id, model_id = ?stored.model_id, "Created chat session");
        self.sessions.insert(0, stored.clone());
        self.active_id = Some(stored.id.clone());
        Ok(stored)
    }

    async fn reselect(&mut self) -> Result<(), ChatError> {
        match most_recent(&self.sessions) {
            Some(id) => self.active_id = Some(id),
            None => {
                self.create_session().await?;
            }
        }
        Ok(())
    }

    fn upsert_cached(&mut self, session: ChatSession) {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => self.sessions.insert(0, session),
        }
    }
}

/// Id of the session with the latest `updated_at`.
fn most_recent(sessions: &[ChatSession]) -> Option<String> {
    sessions
        .iter()
        .max_by_key(|s| s.updated_at)
        .map(|s| s.id.clone())
}
