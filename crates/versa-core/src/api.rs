//! Backend API port.
//!
//! `ApiGateway` is the single point of outbound calls. Implementations attach
//! the given [`AuthHeaders`] to the request and classify failures into
//! [`VersaError::Transport`](crate::VersaError::Transport),
//! [`VersaError::Server`](crate::VersaError::Server) and
//! [`VersaError::Unauthorized`](crate::VersaError::Unauthorized). Reacting to
//! a 401 is the session manager's job, not the gateway's.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assistant::{Assistant, AssistantPatch, NewAssistant};
use crate::auth::{AuthHeaders, AuthResponse, LoginRequest, RegisterRequest};
use crate::conversation::{
    Conversation, ConversationPatch, Message, MessageExchange, NewConversation,
    SendMessageRequest,
};
use crate::error::Result;
use crate::workspace::{Workspace, WorkspacePatch};

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Unauthenticated liveness probe.
    async fn health(&self) -> Result<HealthStatus>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse>;

    /// Succeeds when the token in `auth` is still accepted by the backend.
    async fn verify(&self, auth: &AuthHeaders) -> Result<()>;

    // ---------------------------------------------------------------------
    // Workspaces
    // ---------------------------------------------------------------------

    async fn list_workspaces(&self, auth: &AuthHeaders) -> Result<Vec<Workspace>>;

    async fn get_workspace(&self, auth: &AuthHeaders, workspace_id: &str) -> Result<Workspace>;

    async fn update_workspace(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        patch: &WorkspacePatch,
    ) -> Result<Workspace>;

    // ---------------------------------------------------------------------
    // Assistants
    // ---------------------------------------------------------------------

    async fn list_assistants(&self, auth: &AuthHeaders, workspace_id: &str)
    -> Result<Vec<Assistant>>;

    async fn get_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant>;

    async fn create_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        data: &NewAssistant,
    ) -> Result<Assistant>;

    async fn update_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
        patch: &AssistantPatch,
    ) -> Result<Assistant>;

    async fn delete_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
    ) -> Result<()>;

    // ---------------------------------------------------------------------
    // Conversations
    // ---------------------------------------------------------------------

    async fn list_conversations(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
    ) -> Result<Vec<Conversation>>;

    async fn create_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        data: &NewConversation,
    ) -> Result<Conversation>;

    async fn update_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        conversation_id: &str,
        patch: &ConversationPatch,
    ) -> Result<Conversation>;

    async fn delete_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        conversation_id: &str,
    ) -> Result<()>;

    // ---------------------------------------------------------------------
    // Messages
    // ---------------------------------------------------------------------

    /// Full history, oldest first.
    async fn list_messages(&self, auth: &AuthHeaders, conversation_id: &str)
    -> Result<Vec<Message>>;

    /// Persists the user's message and returns it together with the reply.
    async fn send_message(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
        request: &SendMessageRequest,
    ) -> Result<MessageExchange>;

    async fn delete_message(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<()>;
}
