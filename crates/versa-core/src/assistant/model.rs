//! Assistant domain model.
//!
//! Assistants are the configured AI agents of a workspace. Conversations are
//! always held with exactly one assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model used when the creator does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// System prompt used when the creator does not provide one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Kind of work an assistant is set up for.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssistantType {
    Chat,
    Workflow,
    Search,
    Analysis,
}

impl Default for AssistantType {
    fn default() -> Self {
        AssistantType::Chat
    }
}

impl std::fmt::Display for AssistantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssistantType::Chat => "chat",
            AssistantType::Workflow => "workflow",
            AssistantType::Search => "search",
            AssistantType::Analysis => "analysis",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for AssistantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(AssistantType::Chat),
            "workflow" => Ok(AssistantType::Workflow),
            "search" => Ok(AssistantType::Search),
            "analysis" => Ok(AssistantType::Analysis),
            other => Err(format!("unknown assistant type: {other}")),
        }
    }
}

/// An AI assistant configured in a workspace.
///
/// Keyed by `id`, unique within the workspace.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Assistant {
    /// Unique identifier (UUID format)
    pub id: String,
    /// Display name of the assistant
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub assistant_type: AssistantType,
    /// Backing LLM, e.g. "gpt-4"
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub instructions: String,
    /// Number of times the assistant has been used
    #[serde(default)]
    pub usage_count: u64,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
