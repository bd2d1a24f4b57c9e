//! Composition root.
//!
//! `VersaClient` wires the session manager, the workspace cache and the
//! conversation sync around one gateway and one persistence port, and runs
//! the watcher task that keeps them in step.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use versa_core::api::ApiGateway;
use versa_core::auth::SessionState;
use versa_core::persistence::PersistencePort;

use crate::conversation::ConversationSync;
use crate::session::{SessionEvent, SessionManager};
use crate::workspace::{WorkspaceCache, WorkspaceEvent};

pub struct VersaClient {
    session: Arc<SessionManager>,
    workspace: Arc<WorkspaceCache>,
    conversations: Arc<ConversationSync>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl VersaClient {
    pub fn new(gateway: Arc<dyn ApiGateway>, store: Arc<dyn PersistencePort>) -> Self {
        let session = Arc::new(SessionManager::new(gateway.clone(), store));
        let workspace = Arc::new(WorkspaceCache::new(session.clone(), gateway.clone()));
        let conversations = Arc::new(ConversationSync::new(
            session.clone(),
            gateway,
            workspace.clone(),
        ));

        Self {
            session,
            workspace,
            conversations,
            watcher: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn workspace(&self) -> &Arc<WorkspaceCache> {
        &self.workspace
    }

    pub fn conversations(&self) -> &Arc<ConversationSync> {
        &self.conversations
    }

    /// Startup sequence.
    ///
    /// 1. Verifies the stored session
    /// 2. If that succeeded, loads the workspace data
    /// 3. Starts the watcher that reacts to later session changes
    ///
    /// Workspace data is never requested before a workspace is known.
    pub async fn start(&self) -> SessionState {
        let state = self.session.verify_stored_session().await;

        if state.is_authenticated() {
            match self.workspace.ensure_workspace().await {
                Ok(Some(report)) => {
                    for err in report.errors() {
                        tracing::warn!("[VersaClient] Partial workspace load: {}", err);
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!("[VersaClient] Workspace load failed: {}", err),
            }
        }

        self.spawn_watcher();
        state
    }

    /// Starts the watcher task unless it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_watcher(&self) {
        let mut watcher = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if watcher.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let session_events = self.session.events();
        let workspace_events = self.workspace.subscribe();
        let workspace = self.workspace.clone();
        let conversations = self.conversations.clone();

        *watcher = Some(tokio::spawn(watch(
            session_events,
            workspace_events,
            workspace,
            conversations,
        )));
        tracing::debug!("[VersaClient] Watcher started");
    }
}

impl Drop for VersaClient {
    fn drop(&mut self) {
        let watcher = self.watcher.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = watcher.take() {
            handle.abort();
        }
    }
}

async fn watch(
    mut session_events: Receiver<SessionEvent>,
    mut workspace_events: Receiver<WorkspaceEvent>,
    workspace: Arc<WorkspaceCache>,
    conversations: Arc<ConversationSync>,
) {
    loop {
        tokio::select! {
            event = session_events.recv() => match event {
                Ok(event) => on_session_event(event, &workspace, &conversations).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[VersaClient] Missed {} session event(s)", skipped);
                    reload(&workspace).await;
                }
                Err(RecvError::Closed) => break,
            },
            event = workspace_events.recv() => match event {
                Ok(event) => conversations.apply_workspace_event(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[VersaClient] Missed {} workspace event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    tracing::debug!("[VersaClient] Watcher stopped");
}

async fn on_session_event(
    event: SessionEvent,
    workspace: &WorkspaceCache,
    conversations: &ConversationSync,
) {
    tracing::debug!("[VersaClient] Session event: {:?}", event);
    match event {
        SessionEvent::LoggedIn | SessionEvent::Restored | SessionEvent::WorkspaceChanged(_) => {
            reload(workspace).await;
        }
        SessionEvent::LoggedOut | SessionEvent::Expired => {
            conversations.reset().await;
            workspace.clear().await;
        }
        SessionEvent::UserUpdated => {}
    }
}

async fn reload(workspace: &WorkspaceCache) {
    if let Err(err) = workspace.ensure_workspace().await {
        tracing::warn!("[VersaClient] Workspace reload failed: {}", err);
    }
}
