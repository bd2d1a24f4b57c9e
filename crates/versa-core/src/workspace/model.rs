//! Workspace domain model.
//!
//! A workspace is the tenant that owns assistants and conversations. Exactly
//! one workspace is active per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a member inside a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
    Guest,
}

impl Default for MemberRole {
    fn default() -> Self {
        MemberRole::Member
    }
}

/// A user's membership in a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub user_id: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Represents a workspace as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique workspace identifier (UUID format)
    pub id: String,
    /// Human-readable name, e.g. "Ann's Workspace"
    pub name: String,
    #[serde(default)]
    pub members: Vec<WorkspaceMember>,
    /// URL-friendly name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Billing plan ("free" unless upgraded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            slug: None,
            description: None,
            owner_id: None,
            plan: None,
        }
    }

    /// Role of the given user, if they are a member.
    pub fn role_of(&self, user_id: &str) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }
}

/// Fields that can be changed on a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspacePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
