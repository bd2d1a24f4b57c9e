use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::RwLock;
use versa_core::api::ApiGateway;
use versa_core::conversation::{Message, MessageExchange, SendMessageRequest};
use versa_core::error::{Result, VersaError};

use super::view::{ConversationView, SelectionOutcome, ViewPhase};
use crate::session::SessionManager;
use crate::workspace::{WorkspaceCache, WorkspaceEvent};

/// Message list of the conversation on screen.
///
/// Selecting a conversation takes a ticket; only the response for the
/// newest ticket is applied, so switching quickly between conversations
/// never shows a stale list. Sends are single-flight per conversation.
pub struct ConversationSync {
    session: Arc<SessionManager>,
    gateway: Arc<dyn ApiGateway>,
    cache: Arc<WorkspaceCache>,
    view: RwLock<ConversationView>,
    ticket: AtomicU64,
    sending: Arc<Mutex<HashSet<String>>>,
}

impl ConversationSync {
    pub fn new(
        session: Arc<SessionManager>,
        gateway: Arc<dyn ApiGateway>,
        cache: Arc<WorkspaceCache>,
    ) -> Self {
        Self {
            session,
            gateway,
            cache,
            view: RwLock::new(ConversationView::default()),
            ticket: AtomicU64::new(0),
            sending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub async fn view(&self) -> ConversationView {
        self.view.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.view.read().await.messages.clone()
    }

    pub async fn phase(&self) -> ViewPhase {
        self.view.read().await.phase
    }

    pub async fn active_conversation_id(&self) -> Option<String> {
        self.view.read().await.conversation_id.clone()
    }

    /// True while a send for `conversation_id` is in flight.
    pub fn is_sending(&self, conversation_id: &str) -> bool {
        self.sending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(conversation_id)
    }

    /// Shows a conversation and loads its history.
    ///
    /// With `None`, the most recent cached conversation is selected. The
    /// last call wins: a history that arrives after a newer selection is
    /// dropped and reported as [`SelectionOutcome::Superseded`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation is not cached, or the history
    /// fetch error. On a fetch error the view is emptied and back to `Idle`.
    pub async fn select_conversation(&self, id: Option<&str>) -> Result<SelectionOutcome> {
        let target = match id {
            Some(id) => id.to_string(),
            None => match self.cache.conversations().await.first() {
                Some(conversation) => conversation.id.clone(),
                None => return Ok(SelectionOutcome::NothingToSelect),
            },
        };
        self.cache.select_conversation(Some(target.as_str())).await?;

        let ticket = {
            let mut view = self.view.write().await;
            let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;

            if view.conversation_id.as_deref() == Some(target.as_str()) && view.is_loaded() {
                return Ok(SelectionOutcome::AlreadyLoaded {
                    conversation_id: target,
                });
            }
            view.conversation_id = Some(target.clone());
            view.messages.clear();
            view.phase = ViewPhase::LoadingMessages;
            ticket
        };

        tracing::debug!("[ConversationSync] Loading messages for {}", target);
        let conversation_id = target.as_str();
        let result = self
            .session
            .authorized(|auth| async move {
                self.gateway.list_messages(&auth, conversation_id).await
            })
            .await;

        let mut view = self.view.write().await;
        if self.ticket.load(Ordering::SeqCst) != ticket {
            tracing::debug!("[ConversationSync] Dropping stale messages for {}", target);
            return Ok(SelectionOutcome::Superseded);
        }

        match result {
            Ok(history) => {
                // Pairs from sends confirmed while the history was loading.
                let known: HashSet<&str> = history.iter().map(|m| m.id.as_str()).collect();
                let sent: Vec<Message> = view
                    .messages
                    .drain(..)
                    .filter(|m| !known.contains(m.id.as_str()))
                    .collect();
                view.messages = history;
                view.messages.extend(sent);
                view.phase = ViewPhase::Ready;
                Ok(SelectionOutcome::Loaded {
                    conversation_id: target,
                    count: view.messages.len(),
                })
            }
            Err(err) => {
                tracing::warn!("[ConversationSync] Failed to load messages: {}", err);
                *view = ConversationView::default();
                Err(err.with_fallback("Failed to load messages"))
            }
        }
    }

    /// Sends a message and appends the user/assistant pair.
    ///
    /// The pair is appended only if the conversation is still on screen,
    /// including while its history is loading; the history is merged in
    /// ahead of it when it arrives.
    /// Either way the conversation's `updated_at` is bumped and the list
    /// re-sorted. A failed send leaves the message list untouched.
    ///
    /// # Errors
    ///
    /// - `Validation` for empty or whitespace-only content (no network call)
    /// - `Busy` if a send for the same conversation is in flight
    /// - the backend error otherwise
    pub async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<MessageExchange> {
        let request = SendMessageRequest::new(content)?;
        let _flight = InFlightGuard::acquire(&self.sending, conversation_id)?;

        {
            let mut view = self.view.write().await;
            if view.shows(conversation_id) && view.phase == ViewPhase::Ready {
                view.phase = ViewPhase::SendingMessage;
            }
        }

        let result = self
            .session
            .authorized(|auth| {
                let request = &request;
                async move {
                    self.gateway
                        .send_message(&auth, conversation_id, request)
                        .await
                }
            })
            .await;

        {
            let mut view = self.view.write().await;
            let on_screen = view.shows(conversation_id);
            if on_screen && view.phase == ViewPhase::SendingMessage {
                view.phase = ViewPhase::Ready;
            }
            if let Ok(exchange) = &result {
                if on_screen {
                    view.messages.push(exchange.user_message.clone());
                    view.messages.push(exchange.assistant_message.clone());
                }
            }
        }

        match result {
            Ok(exchange) => {
                self.cache
                    .touch_conversation(conversation_id, Utc::now())
                    .await;
                Ok(exchange)
            }
            Err(err) => {
                tracing::warn!("[ConversationSync] Send to {} failed: {}", conversation_id, err);
                Err(err.with_fallback("Failed to send message"))
            }
        }
    }

    /// Deletes one message and removes it from the list.
    pub async fn delete_message(&self, conversation_id: &str, message_id: &str) -> Result<()> {
        self.session
            .authorized(|auth| async move {
                self.gateway
                    .delete_message(&auth, conversation_id, message_id)
                    .await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to delete message"))?;

        let mut view = self.view.write().await;
        if view.shows(conversation_id) {
            view.messages.retain(|m| m.id != message_id);
        }
        Ok(())
    }

    /// Deletes a conversation and clears the view if it was on screen.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        self.cache.delete_conversation(conversation_id).await?;
        self.forget(&[conversation_id.to_string()]).await;
        Ok(())
    }

    /// Mirrors a cache change into the view.
    pub async fn apply_workspace_event(&self, event: &WorkspaceEvent) {
        match event {
            WorkspaceEvent::Cleared => self.reset().await,
            WorkspaceEvent::ConversationsRemoved(ids) => self.forget(ids).await,
            WorkspaceEvent::Reloaded { .. } => {
                let Some(id) = self.active_conversation_id().await else {
                    return;
                };
                if self.cache.get_conversation(&id).await.is_none() {
                    self.forget(&[id]).await;
                }
            }
        }
    }

    /// Empties the view and drops any pending history load.
    pub async fn reset(&self) {
        let mut view = self.view.write().await;
        self.ticket.fetch_add(1, Ordering::SeqCst);
        *view = ConversationView::default();
    }

    async fn forget(&self, ids: &[String]) {
        let mut view = self.view.write().await;
        let shown = view
            .conversation_id
            .as_ref()
            .is_some_and(|current| ids.contains(current));
        if shown {
            tracing::debug!("[ConversationSync] Conversation on screen was removed");
            self.ticket.fetch_add(1, Ordering::SeqCst);
            *view = ConversationView::default();
        }
    }
}

/// Marks a conversation as sending for as long as it lives.
struct InFlightGuard {
    sending: Arc<Mutex<HashSet<String>>>,
    conversation_id: String,
}

impl InFlightGuard {
    fn acquire(sending: &Arc<Mutex<HashSet<String>>>, conversation_id: &str) -> Result<Self> {
        let inserted = sending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conversation_id.to_string());
        if !inserted {
            return Err(VersaError::busy("A message is already being sent"));
        }
        Ok(Self {
            sending: Arc::clone(sending),
            conversation_id: conversation_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.sending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.conversation_id);
    }
}
