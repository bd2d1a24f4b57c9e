//! User domain model.
//!
//! The signed-in user as returned by the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user.
///
/// Owned by the session and replaced wholesale on update; the client never
/// patches individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier (UUID format)
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// IDs of the workspaces the user belongs to
    #[serde(default)]
    pub workspaces: Vec<String>,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a user with only the identifying fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar_url: None,
            workspaces: Vec::new(),
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_without_email_deserializes() {
        let user: User = serde_json::from_str(r#"{"id":"u1","name":"Ann"}"#).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "");
        assert!(user.workspaces.is_empty());
    }

    #[test]
    fn test_backend_user_payload() {
        let json = r#"{
            "id": "u1",
            "email": "a@b.com",
            "name": "Ann",
            "avatar_url": null,
            "created_at": "2024-05-01T09:30:00.123456",
            "updated_at": "2024-05-01T09:30:00.123456",
            "workspaces": ["w1"]
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.workspaces, vec!["w1".to_string()]);
        assert!(user.created_at.is_some());
    }
}
