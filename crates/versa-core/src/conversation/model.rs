//! Conversation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title the backend gives conversations created without one.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Archived,
    Deleted,
}

impl Default for ConversationStatus {
    fn default() -> Self {
        ConversationStatus::Active
    }
}

/// A conversation between the user and one assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format)
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// The assistant this conversation is held with
    pub assistant_id: String,
    #[serde(default)]
    pub status: ConversationStatus,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last activity; drives the list ordering
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_title() -> String {
    DEFAULT_CONVERSATION_TITLE.to_string()
}

/// Sorts conversations most-recent-first by `updated_at`.
///
/// The sort is stable, so entries with equal timestamps keep their relative
/// order (a freshly prepended conversation stays in front).
pub fn sort_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Returns true if the slice is ordered by `updated_at` descending.
pub fn is_sorted_by_recency(conversations: &[Conversation]) -> bool {
    conversations
        .windows(2)
        .all(|pair| pair[0].updated_at >= pair[1].updated_at)
}
