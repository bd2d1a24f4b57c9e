//! HttpApiGateway - REST implementation of the VERSATIL backend API.
//!
//! Every call goes through [`HttpApiGateway::execute`], which is the one
//! place transport failures and error statuses are classified:
//!
//! - no response → `VersaError::Transport`
//! - `401` → `VersaError::Unauthorized`
//! - any other non-2xx → `VersaError::Server` with the body's `detail` /
//!   `message`, if any

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use versa_core::api::{ApiGateway, HealthStatus};
use versa_core::assistant::{Assistant, AssistantPatch, NewAssistant};
use versa_core::auth::{AuthHeaders, AuthResponse, LoginRequest, RegisterRequest};
use versa_core::config::ClientConfig;
use versa_core::conversation::{
    Conversation, ConversationPatch, Message, MessageExchange, NewConversation,
    SendMessageRequest,
};
use versa_core::error::{Result, VersaError};
use versa_core::workspace::{Workspace, WorkspacePatch};

use crate::error_body::extract_error_message;

/// Gateway that talks to the backend over HTTP/JSON.
#[derive(Clone)]
pub struct HttpApiGateway {
    client: Client,
    base_url: String,
}

impl HttpApiGateway {
    /// Creates a gateway from the client configuration.
    ///
    /// The configured request timeout is the only timeout applied to calls.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| VersaError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.normalized_base_url()))
    }

    /// Creates a gateway around an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, auth: Option<&AuthHeaders>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[HttpApiGateway] {} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(auth) = auth {
            for (name, value) in auth.iter() {
                request = request.header(name, value);
            }
        }
        request
    }

    fn with_body<B: Serialize + ?Sized>(request: RequestBuilder, body: &B) -> RequestBuilder {
        request.json(body)
    }

    /// Sends the request and decodes a JSON body on success.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| VersaError::Serialization {
            format: "JSON".to_string(),
            message: e.to_string(),
        })
    }

    /// Sends the request and ignores the body on success.
    async fn execute_empty(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("[HttpApiGateway] Request failed without response: {}", e);
            VersaError::transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::debug!(
            "[HttpApiGateway] Error status {}: {}",
            status,
            message.as_deref().unwrap_or("<no message>")
        );

        Err(classify_status(status, message))
    }
}

fn classify_status(status: StatusCode, message: Option<String>) -> VersaError {
    if status == StatusCode::UNAUTHORIZED {
        VersaError::Unauthorized { message }
    } else {
        VersaError::server(status.as_u16(), message)
    }
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn health(&self) -> Result<HealthStatus> {
        self.execute(self.request(Method::GET, "/health", None)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let builder = self.request(Method::POST, "/auth/login", None);
        self.execute(Self::with_body(builder, request)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let builder = self.request(Method::POST, "/auth/register", None);
        self.execute(Self::with_body(builder, request)).await
    }

    async fn verify(&self, auth: &AuthHeaders) -> Result<()> {
        self.execute_empty(self.request(Method::GET, "/auth/verify", Some(auth)))
            .await
    }

    async fn list_workspaces(&self, auth: &AuthHeaders) -> Result<Vec<Workspace>> {
        self.execute(self.request(Method::GET, "/workspaces", Some(auth)))
            .await
    }

    async fn get_workspace(&self, auth: &AuthHeaders, workspace_id: &str) -> Result<Workspace> {
        let path = format!("/workspaces/{}", workspace_id);
        self.execute(self.request(Method::GET, &path, Some(auth)))
            .await
    }

    async fn update_workspace(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        patch: &WorkspacePatch,
    ) -> Result<Workspace> {
        let path = format!("/workspaces/{}", workspace_id);
        let builder = self.request(Method::PUT, &path, Some(auth));
        self.execute(Self::with_body(builder, patch)).await
    }

    async fn list_assistants(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
    ) -> Result<Vec<Assistant>> {
        let path = format!("/workspaces/{}/assistants", workspace_id);
        self.execute(self.request(Method::GET, &path, Some(auth)))
            .await
    }

    async fn get_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant> {
        let path = format!("/workspaces/{}/assistants/{}", workspace_id, assistant_id);
        self.execute(self.request(Method::GET, &path, Some(auth)))
            .await
    }

    async fn create_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        data: &NewAssistant,
    ) -> Result<Assistant> {
        let path = format!("/workspaces/{}/assistants", workspace_id);
        let builder = self.request(Method::POST, &path, Some(auth));
        self.execute(Self::with_body(builder, data)).await
    }

    async fn update_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
        patch: &AssistantPatch,
    ) -> Result<Assistant> {
        let path = format!("/workspaces/{}/assistants/{}", workspace_id, assistant_id);
        let builder = self.request(Method::PUT, &path, Some(auth));
        self.execute(Self::with_body(builder, patch)).await
    }

    async fn delete_assistant(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        assistant_id: &str,
    ) -> Result<()> {
        let path = format!("/workspaces/{}/assistants/{}", workspace_id, assistant_id);
        self.execute_empty(self.request(Method::DELETE, &path, Some(auth)))
            .await
    }

    async fn list_conversations(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
    ) -> Result<Vec<Conversation>> {
        let path = format!("/workspaces/{}/conversations", workspace_id);
        self.execute(self.request(Method::GET, &path, Some(auth)))
            .await
    }

    async fn create_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        data: &NewConversation,
    ) -> Result<Conversation> {
        let path = format!("/workspaces/{}/conversations", workspace_id);
        let builder = self.request(Method::POST, &path, Some(auth));
        self.execute(Self::with_body(builder, data)).await
    }

    async fn update_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        conversation_id: &str,
        patch: &ConversationPatch,
    ) -> Result<Conversation> {
        let path = format!(
            "/workspaces/{}/conversations/{}",
            workspace_id, conversation_id
        );
        let builder = self.request(Method::PUT, &path, Some(auth));
        self.execute(Self::with_body(builder, patch)).await
    }

    async fn delete_conversation(
        &self,
        auth: &AuthHeaders,
        workspace_id: &str,
        conversation_id: &str,
    ) -> Result<()> {
        let path = format!(
            "/workspaces/{}/conversations/{}",
            workspace_id, conversation_id
        );
        self.execute_empty(self.request(Method::DELETE, &path, Some(auth)))
            .await
    }

    async fn list_messages(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
    ) -> Result<Vec<Message>> {
        let path = format!("/conversations/{}/messages", conversation_id);
        self.execute(self.request(Method::GET, &path, Some(auth)))
            .await
    }

    async fn send_message(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
        request: &SendMessageRequest,
    ) -> Result<MessageExchange> {
        let path = format!("/conversations/{}/messages", conversation_id);
        let builder = self.request(Method::POST, &path, Some(auth));
        self.execute(Self::with_body(builder, request)).await
    }

    async fn delete_message(
        &self,
        auth: &AuthHeaders,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<()> {
        let path = format!("/conversations/{}/messages/{}", conversation_id, message_id);
        self.execute_empty(self.request(Method::DELETE, &path, Some(auth)))
            .await
    }
}
