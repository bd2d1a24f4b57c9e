use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use versa_core::api::ApiGateway;
use versa_core::assistant::{Assistant, AssistantPatch, NewAssistant};
use versa_core::auth::AuthHeaders;
use versa_core::conversation::{
    Conversation, ConversationPatch, DEFAULT_CONVERSATION_TITLE, NewConversation, sort_by_recency,
};
use versa_core::error::{Result, VersaError};

use super::report::{LoadReport, WorkspaceEvent};
use crate::session::SessionManager;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct CacheState {
    /// Workspace the lists belong to
    workspace_id: Option<String>,
    assistants: Vec<Assistant>,
    conversations: Vec<Conversation>,
    current_assistant: Option<Assistant>,
    current_conversation: Option<Conversation>,
    loading: bool,
    /// Bumped on every load and clear; a load whose generation is no longer
    /// current drops its results.
    generation: u64,
}

impl CacheState {
    fn holds(&self, workspace_id: &str) -> bool {
        self.workspace_id.as_deref() == Some(workspace_id)
    }

    fn refresh_current_assistant(&mut self) {
        if let Some(id) = self.current_assistant.as_ref().map(|a| a.id.clone()) {
            self.current_assistant = self.assistants.iter().find(|a| a.id == id).cloned();
        }
    }

    fn refresh_current_conversation(&mut self) {
        if let Some(id) = self.current_conversation.as_ref().map(|c| c.id.clone()) {
            self.current_conversation = self.conversations.iter().find(|c| c.id == id).cloned();
        }
    }
}

/// In-memory mirror of the active workspace's assistants and conversations.
///
/// Mutations are confirm-then-mutate: the cache only changes after the
/// backend accepted the change. The conversation list is kept sorted by
/// `updated_at`, newest first.
pub struct WorkspaceCache {
    session: Arc<SessionManager>,
    gateway: Arc<dyn ApiGateway>,
    state: RwLock<CacheState>,
    events: broadcast::Sender<WorkspaceEvent>,
}

impl WorkspaceCache {
    pub fn new(session: Arc<SessionManager>, gateway: Arc<dyn ApiGateway>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session,
            gateway,
            state: RwLock::new(CacheState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.events.subscribe()
    }

    // ============================================================================
    // Loading
    // ============================================================================

    /// Loads assistants and conversations of the session's workspace.
    ///
    /// Both lists are fetched concurrently. A failure of one list does not
    /// prevent the other from populating; both outcomes are in the returned
    /// [`LoadReport`]. If the workspace changed or the cache was cleared
    /// while the fetches were in flight, the results are dropped and the
    /// report is marked `discarded`.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when the session has no workspace.
    pub async fn load_all(&self) -> Result<LoadReport> {
        let workspace_id = self.workspace_id()?;

        let generation = {
            let mut state = self.state.write().await;
            if !state.holds(&workspace_id) {
                *state = CacheState {
                    generation: state.generation,
                    ..CacheState::default()
                };
                state.workspace_id = Some(workspace_id.clone());
            }
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        tracing::info!("[WorkspaceCache] Loading workspace {}", workspace_id);
        let ws = workspace_id.as_str();
        let (assistants, conversations) = futures::join!(
            self.call("Failed to load assistants", |auth| async move {
                self.gateway.list_assistants(&auth, ws).await
            }),
            self.call("Failed to load conversations", |auth| async move {
                self.gateway.list_conversations(&auth, ws).await
            }),
        );

        let mut state = self.state.write().await;
        if state.generation != generation || !state.holds(ws) {
            tracing::debug!(
                "[WorkspaceCache] Dropping stale load for workspace {}",
                workspace_id
            );
            return Ok(LoadReport::discarded(workspace_id));
        }
        state.loading = false;

        let assistants = assistants.map(|list| {
            let count = list.len();
            state.assistants = list;
            state.refresh_current_assistant();
            count
        });
        let conversations = conversations.map(|mut list| {
            sort_by_recency(&mut list);
            let count = list.len();
            state.conversations = list;
            state.refresh_current_conversation();
            count
        });
        drop(state);

        let report = LoadReport {
            workspace_id: workspace_id.clone(),
            assistants,
            conversations,
            discarded: false,
        };
        tracing::info!(
            "[WorkspaceCache] Loaded workspace {} (complete: {})",
            workspace_id,
            report.is_complete()
        );
        self.emit(WorkspaceEvent::Reloaded { workspace_id });
        Ok(report)
    }

    /// Reloads the cache when the session's workspace differs from the
    /// loaded one. Returns `None` when nothing had to be loaded.
    pub async fn ensure_workspace(&self) -> Result<Option<LoadReport>> {
        let target = self.session.current_workspace_id();
        let loaded = self.state.read().await.workspace_id.clone();
        if target == loaded {
            return Ok(None);
        }

        self.clear().await;
        match target {
            Some(_) => self.load_all().await.map(Some),
            None => Ok(None),
        }
    }

    /// Drops everything and cancels in-flight loads.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            *state = CacheState {
                generation: state.generation + 1,
                ..CacheState::default()
            };
        }
        tracing::debug!("[WorkspaceCache] Cleared");
        self.emit(WorkspaceEvent::Cleared);
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub async fn assistants(&self) -> Vec<Assistant> {
        self.state.read().await.assistants.clone()
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    pub async fn current_assistant(&self) -> Option<Assistant> {
        self.state.read().await.current_assistant.clone()
    }

    pub async fn current_conversation(&self) -> Option<Conversation> {
        self.state.read().await.current_conversation.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Workspace the cached lists belong to.
    pub async fn loaded_workspace_id(&self) -> Option<String> {
        self.state.read().await.workspace_id.clone()
    }

    pub async fn get_assistant(&self, id: &str) -> Option<Assistant> {
        let state = self.state.read().await;
        state.assistants.iter().find(|a| a.id == id).cloned()
    }

    pub async fn get_conversation(&self, id: &str) -> Option<Conversation> {
        let state = self.state.read().await;
        state.conversations.iter().find(|c| c.id == id).cloned()
    }

    /// Sets or clears the current assistant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `id` is not cached; the selection is unchanged.
    pub async fn select_assistant(&self, id: Option<&str>) -> Result<Option<Assistant>> {
        let mut state = self.state.write().await;
        let selected = match id {
            Some(id) => Some(
                state
                    .assistants
                    .iter()
                    .find(|a| a.id == id)
                    .cloned()
                    .ok_or_else(|| VersaError::not_found("Assistant", id))?,
            ),
            None => None,
        };
        state.current_assistant = selected.clone();
        Ok(selected)
    }

    /// Sets or clears the current conversation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `id` is not cached; the selection is unchanged.
    pub async fn select_conversation(&self, id: Option<&str>) -> Result<Option<Conversation>> {
        let mut state = self.state.write().await;
        let selected = match id {
            Some(id) => Some(
                state
                    .conversations
                    .iter()
                    .find(|c| c.id == id)
                    .cloned()
                    .ok_or_else(|| VersaError::not_found("Conversation", id))?,
            ),
            None => None,
        };
        state.current_conversation = selected.clone();
        Ok(selected)
    }

    /// Bumps a conversation's `updated_at` and re-sorts the list.
    ///
    /// Returns false if the conversation is not cached.
    pub async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> bool {
        let mut state = self.state.write().await;
        let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        conversation.updated_at = at;
        sort_by_recency(&mut state.conversations);
        state.refresh_current_conversation();
        true
    }

    // ============================================================================
    // Assistants
    // ============================================================================

    /// Creates an assistant and appends it once the backend confirms.
    pub async fn create_assistant(&self, data: NewAssistant) -> Result<Assistant> {
        data.validate()?;
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        let created = self
            .call("Failed to create assistant", |auth| {
                let data = &data;
                async move { self.gateway.create_assistant(&auth, ws, data).await }
            })
            .await?;

        let mut state = self.state.write().await;
        if state.holds(ws) {
            state.assistants.push(created.clone());
        }
        tracing::info!("[WorkspaceCache] Created assistant {}", created.id);
        Ok(created)
    }

    /// Applies a partial update and replaces the cached copy.
    pub async fn update_assistant(&self, id: &str, patch: AssistantPatch) -> Result<Assistant> {
        patch.validate()?;
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        let updated = self
            .call("Failed to update assistant", |auth| {
                let patch = &patch;
                async move { self.gateway.update_assistant(&auth, ws, id, patch).await }
            })
            .await?;

        let mut state = self.state.write().await;
        if state.holds(ws) {
            replace_assistant(&mut state, updated.clone());
        }
        Ok(updated)
    }

    /// Fetches one assistant and refreshes the cached copy.
    pub async fn fetch_assistant(&self, id: &str) -> Result<Assistant> {
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        let fetched = self
            .call("Failed to load assistant", |auth| async move {
                self.gateway.get_assistant(&auth, ws, id).await
            })
            .await?;

        let mut state = self.state.write().await;
        if state.holds(ws) {
            replace_assistant(&mut state, fetched.clone());
        }
        Ok(fetched)
    }

    /// Deletes an assistant along with its cached conversations.
    ///
    /// The ids of the dropped conversations are announced through
    /// [`WorkspaceEvent::ConversationsRemoved`].
    pub async fn delete_assistant(&self, id: &str) -> Result<()> {
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        self.call("Failed to delete assistant", |auth| async move {
            self.gateway.delete_assistant(&auth, ws, id).await
        })
        .await?;

        let removed = {
            let mut state = self.state.write().await;
            if !state.holds(ws) {
                return Ok(());
            }
            state.assistants.retain(|a| a.id != id);
            if state.current_assistant.as_ref().is_some_and(|a| a.id == id) {
                state.current_assistant = None;
            }

            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.conversations)
                .into_iter()
                .partition(|c| c.assistant_id == id);
            state.conversations = kept;
            state.refresh_current_conversation();
            removed.into_iter().map(|c| c.id).collect::<Vec<_>>()
        };

        tracing::info!(
            "[WorkspaceCache] Deleted assistant {} and {} conversation(s)",
            id,
            removed.len()
        );
        if !removed.is_empty() {
            self.emit(WorkspaceEvent::ConversationsRemoved(removed));
        }
        Ok(())
    }

    // ============================================================================
    // Conversations
    // ============================================================================

    /// Creates a conversation and prepends it once the backend confirms.
    ///
    /// `title` defaults to "New Conversation".
    pub async fn create_conversation(
        &self,
        assistant_id: &str,
        title: Option<&str>,
    ) -> Result<Conversation> {
        let data = NewConversation::new(assistant_id, title.unwrap_or(DEFAULT_CONVERSATION_TITLE));
        data.validate()?;
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        let created = self
            .call("Failed to create conversation", |auth| {
                let data = &data;
                async move { self.gateway.create_conversation(&auth, ws, data).await }
            })
            .await?;

        let mut state = self.state.write().await;
        if state.holds(ws) {
            state.conversations.insert(0, created.clone());
            sort_by_recency(&mut state.conversations);
        }
        tracing::info!("[WorkspaceCache] Created conversation {}", created.id);
        Ok(created)
    }

    /// Applies a partial update and replaces the cached copy.
    pub async fn update_conversation(
        &self,
        id: &str,
        patch: ConversationPatch,
    ) -> Result<Conversation> {
        patch.validate()?;
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        let updated = self
            .call("Failed to update conversation", |auth| {
                let patch = &patch;
                async move {
                    self.gateway
                        .update_conversation(&auth, ws, id, patch)
                        .await
                }
            })
            .await?;

        let mut state = self.state.write().await;
        if state.holds(ws) {
            if let Some(slot) = state.conversations.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
            sort_by_recency(&mut state.conversations);
            state.refresh_current_conversation();
        }
        Ok(updated)
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        let workspace_id = self.workspace_id()?;
        let ws = workspace_id.as_str();

        self.call("Failed to delete conversation", |auth| async move {
            self.gateway.delete_conversation(&auth, ws, id).await
        })
        .await?;

        {
            let mut state = self.state.write().await;
            if !state.holds(ws) {
                return Ok(());
            }
            state.conversations.retain(|c| c.id != id);
            if state.current_conversation.as_ref().is_some_and(|c| c.id == id) {
                state.current_conversation = None;
            }
        }

        tracing::info!("[WorkspaceCache] Deleted conversation {}", id);
        self.emit(WorkspaceEvent::ConversationsRemoved(vec![id.to_string()]));
        Ok(())
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    fn workspace_id(&self) -> Result<String> {
        self.session
            .current_workspace_id()
            .ok_or(VersaError::NotAuthenticated)
    }

    async fn call<T, F, Fut>(&self, fallback: &str, call: F) -> Result<T>
    where
        F: FnOnce(AuthHeaders) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.session.authorized(call).await.map_err(|err| {
            tracing::warn!("[WorkspaceCache] {}: {}", fallback, err);
            err.with_fallback(fallback)
        })
    }

    fn emit(&self, event: WorkspaceEvent) {
        let _ = self.events.send(event);
    }
}

fn replace_assistant(state: &mut CacheState, assistant: Assistant) {
    match state.assistants.iter_mut().find(|a| a.id == assistant.id) {
        Some(slot) => *slot = assistant,
        None => state.assistants.push(assistant),
    }
    state.refresh_current_assistant();
}
