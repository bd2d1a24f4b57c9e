//! Scripted gateway and fixtures for the application-layer tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use versa_core::api::{ApiGateway, HealthStatus};
use versa_core::assistant::{Assistant, AssistantPatch, AssistantType, NewAssistant};
use versa_core::auth::{AuthHeaders, AuthResponse, LoginRequest, RegisterRequest};
use versa_core::conversation::{
    Conversation, ConversationPatch, ConversationStatus, Message, MessageExchange, MessageRole,
    NewConversation, SendMessageRequest,
};
use versa_core::error::{Result, VersaError};
use versa_core::user::User;
use versa_core::workspace::{Workspace, WorkspacePatch};

struct Reply {
    delay: Option<Duration>,
    result: Result<Value>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub token: Option<String>,
}

/// Gateway whose responses are queued per call key.
///
/// Keys are the method name, optionally followed by `:` and the id the call
/// targets (`list_messages:c1`). A reply queued under the exact key wins over
/// one queued under the bare method name. Unscripted calls fail with
/// `Internal`.
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply<T: Serialize>(&self, key: &str, value: T) {
        self.push(key, None, Ok(serde_json::to_value(value).unwrap()));
    }

    pub fn reply_after<T: Serialize>(&self, key: &str, delay: Duration, value: T) {
        self.push(key, Some(delay), Ok(serde_json::to_value(value).unwrap()));
    }

    pub fn fail(&self, key: &str, err: VersaError) {
        self.push(key, None, Err(err));
    }

    pub fn fail_after(&self, key: &str, delay: Duration, err: VersaError) {
        self.push(key, Some(delay), Err(err));
    }

    fn push(&self, key: &str, delay: Option<Duration>, result: Result<Value>) {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Reply { delay, result });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made to `method`, whatever id they targeted.
    pub fn call_count(&self, method: &str) -> usize {
        let prefix = format!("{method}:");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.key == method || call.key.starts_with(&prefix))
            .count()
    }

    async fn respond<T: DeserializeOwned>(
        &self,
        method: &str,
        id: Option<&str>,
        auth: Option<&AuthHeaders>,
    ) -> Result<T> {
        let key = match id {
            Some(id) => format!("{method}:{id}"),
            None => method.to_string(),
        };
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.clone(),
            token: auth.and_then(|a| a.token().map(str::to_string)),
        });

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            let exact = replies.get_mut(&key).and_then(VecDeque::pop_front);
            exact.or_else(|| replies.get_mut(method).and_then(VecDeque::pop_front))
        };
        let Some(reply) = reply else {
            return Err(VersaError::internal(format!("unscripted call: {key}")));
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        let value = reply.result?;
        Ok(serde_json::from_value(value).unwrap())
    }
}

#[async_trait]
impl ApiGateway for MockGateway {
    async fn health(&self) -> Result<HealthStatus> {
        self.respond("health", None, None).await
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse> {
        self.respond("login", None, None).await
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse> {
        self.respond("register", None, None).await
    }

    async fn verify(&self, auth: &AuthHeaders) -> Result<()> {
        self.respond("verify", None, Some(auth)).await
    }

    async fn list_workspaces(&self, auth: &AuthHeaders) -> Result<Vec<Workspace>> {
        self.respond("list_workspaces", None, Some(auth)).await
    }

    async fn get_workspace(&self, auth: &AuthHeaders, workspace_id: &str) -> Result<Workspace> {
        self.respond("get_workspace", Some(workspace_id), Some(auth))
            .await
    }

    async fn update_workspace(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        _patch: &WorkspacePatch,
    ) -> Result<Workspace> {
        self.respond("update_workspace", Some(workspace_id), Some(auth))
            .await
    }

    async fn list_assistants(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
    ) -> Result<Vec<Assistant>> {
        self.respond("list_assistants", Some(workspace_id), Some(auth))
            .await
    }

    async fn get_assistant(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant> {
        self.respond("get_assistant", Some(assistant_id), Some(auth))
            .await
    }

    async fn create_assistant(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        _data: &NewAssistant,
    ) -> Result<Assistant> {
        self.respond("create_assistant", None, Some(auth)).await
    }

    async fn update_assistant(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        assistant_id: &str,
        _patch: &AssistantPatch,
    ) -> Result<Assistant> {
        self.respond("update_assistant", Some(assistant_id), Some(auth))
            .await
    }

    async fn delete_assistant(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        assistant_id: &str,
    ) -> Result<()> {
        self.respond("delete_assistant", Some(assistant_id), Some(auth))
            .await
    }

    async fn list_conversations(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
    ) -> Result<Vec<Conversation>> {
        self.respond("list_conversations", Some(workspace_id), Some(auth))
            .await
    }

    async fn create_conversation(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        _data: &NewConversation,
    ) -> Result<Conversation> {
        self.respond("create_conversation", None, Some(auth)).await
    }

    async fn update_conversation(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        conversation_id: &str,
        _patch: &ConversationPatch,
    ) -> Result<Conversation> {
        self.respond("update_conversation", Some(conversation_id), Some(auth))
            .await
    }

    async fn delete_conversation(
        &self,
        auth: &AuthHeaders,
        _workspace_id: &str,
        conversation_id: &str,
    ) -> Result<()> {
        self.respond("delete_conversation", Some(conversation_id), Some(auth))
            .await
    }

    async fn list_messages(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
    ) -> Result<Vec<Message>> {
        self.respond("list_messages", Some(conversation_id), Some(auth))
            .await
    }

    async fn send_message(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
        _request: &SendMessageRequest,
    ) -> Result<MessageExchange> {
        self.respond("send_message", Some(conversation_id), Some(auth))
            .await
    }

    async fn delete_message(
        &self,
        auth: &AuthHeaders,
        _conversation_id: &str,
        message_id: &str,
    ) -> Result<()> {
        self.respond("delete_message", Some(message_id), Some(auth))
            .await
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn user(id: &str, name: &str) -> User {
    User::new(id, name, "a@b.com")
}

pub fn workspace(id: &str) -> Workspace {
    Workspace::new(id, "Ann's Workspace")
}

pub fn auth_response(token: &str, workspace_id: &str) -> AuthResponse {
    AuthResponse {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
        user: user("u1", "Ann"),
        workspace: workspace(workspace_id),
    }
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::minutes(minutes)
}

pub fn assistant(id: &str, name: &str) -> Assistant {
    Assistant {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        assistant_type: AssistantType::Chat,
        model: "gpt-4".to_string(),
        system_prompt: "You are a helpful AI assistant.".to_string(),
        instructions: String::new(),
        usage_count: 0,
        created_at: minutes_ago(60),
    }
}

pub fn conversation(id: &str, assistant_id: &str, updated_minutes_ago: i64) -> Conversation {
    Conversation {
        id: id.to_string(),
        title: format!("Conversation {id}"),
        assistant_id: assistant_id.to_string(),
        status: ConversationStatus::Active,
        created_at: minutes_ago(120),
        updated_at: minutes_ago(updated_minutes_ago),
    }
}

pub fn message(conversation_id: &str, role: MessageRole, content: &str) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        role,
        content: content.to_string(),
        created_at: Utc::now(),
    }
}

pub fn exchange(conversation_id: &str, content: &str, answer: &str) -> MessageExchange {
    MessageExchange {
        user_message: message(conversation_id, MessageRole::User, content),
        assistant_message: message(conversation_id, MessageRole::Assistant, answer),
    }
}
