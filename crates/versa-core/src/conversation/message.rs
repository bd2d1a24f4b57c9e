//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Reply generated by the assistant.
    Assistant,
    /// System-generated message (only ever read from history).
    System,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        };
        f.write_str(name)
    }
}

/// A single persisted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Response of `POST /conversations/{id}/messages`.
///
/// The backend persists the user's message and the generated reply together;
/// the client always applies them as a pair, user first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageExchange {
    pub user_message: Message,
    pub assistant_message: Message,
}

impl MessageExchange {
    /// The pair in display order.
    pub fn into_messages(self) -> [Message; 2] {
        [self.user_message, self.assistant_message]
    }
}
