//! Request payloads for conversations and messages.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VersaError};

/// Payload for `POST /workspaces/{id}/conversations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConversation {
    pub assistant_id: String,
    pub title: String,
}

impl NewConversation {
    pub fn new(assistant_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            title: title.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.assistant_id.trim().is_empty() {
            return Err(VersaError::validation("An assistant must be selected"));
        }
        if self.title.trim().is_empty() {
            return Err(VersaError::validation("Conversation title is required"));
        }
        Ok(())
    }
}

/// Partial update for a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<super::ConversationStatus>,
}

impl ConversationPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.is_none() && self.status.is_none() {
            return Err(VersaError::validation("Nothing to update"));
        }
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(VersaError::validation("Conversation title cannot be empty"));
        }
        Ok(())
    }
}

/// Payload for `POST /conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

impl SendMessageRequest {
    /// Builds the request, rejecting empty or whitespace-only content.
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(VersaError::validation("Message cannot be empty"));
        }
        Ok(Self { content })
    }
}
