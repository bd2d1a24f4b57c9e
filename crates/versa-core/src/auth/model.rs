//! Authentication requests, responses and session states.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VersaError};
use crate::user::User;
use crate::workspace::Workspace;

/// Where the session state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session and nothing being attempted.
    Anonymous,
    /// A persisted session is waiting for verification.
    Initializing,
    /// Token and user are present.
    Authenticated,
    /// The last login or registration attempt failed.
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(VersaError::validation("Email is required"));
        }
        if self.password.is_empty() {
            return Err(VersaError::validation("Password is required"));
        }
        Ok(())
    }
}

/// Payload for `POST /auth/register`.
///
/// `workspace_name` is sent as given. Callers that want the conventional
/// default fill it with [`RegisterRequest::default_workspace_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            workspace_name: None,
        }
    }

    pub fn with_workspace_name(mut self, workspace_name: impl Into<String>) -> Self {
        self.workspace_name = Some(workspace_name.into());
        self
    }

    /// `"<name>'s Workspace"`.
    pub fn default_workspace_name(name: &str) -> String {
        format!("{}'s Workspace", name.trim())
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VersaError::validation("Name is required"));
        }
        LoginRequest::new(self.email.clone(), self.password.clone()).validate()
    }
}

/// Response of the login and registration endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
    pub workspace: Workspace,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workspace_name() {
        assert_eq!(RegisterRequest::default_workspace_name("Ann"), "Ann's Workspace");
    }

    #[test]
    fn test_register_without_workspace_omits_field() {
        let request = RegisterRequest::new("Ann", "a@b.com", "secret1");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("workspace_name").is_none());
    }

    #[test]
    fn test_login_validation() {
        assert!(LoginRequest::new("", "secret1").validate().is_err());
        assert!(LoginRequest::new("a@b.com", "").validate().is_err());
        assert!(LoginRequest::new("a@b.com", "secret1").validate().is_ok());
        assert!(RegisterRequest::new(" ", "a@b.com", "x").validate().is_err());
    }

    #[test]
    fn test_auth_response_from_scenario_payload() {
        let json = r#"{
            "access_token": "tok1",
            "user": {"id": "u1", "name": "Ann"},
            "workspace": {"id": "w1", "name": "Ann's Workspace"}
        }"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok1");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.workspace.id, "w1");
    }
}
