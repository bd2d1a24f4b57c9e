//! Request payloads for creating and updating assistants.

use serde::{Deserialize, Serialize};

use super::model::AssistantType;
use crate::error::{Result, VersaError};

/// Payload for `POST /workspaces/{id}/assistants`.
///
/// Only `name` is required; the backend fills the rest with its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAssistant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub assistant_type: Option<AssistantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl NewAssistant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, assistant_type: AssistantType) -> Self {
        self.assistant_type = Some(assistant_type);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rejects payloads the backend would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VersaError::validation("Assistant name is required"));
        }
        Ok(())
    }
}

/// Partial update for `PUT /workspaces/{id}/assistants/{assistant_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub assistant_type: Option<AssistantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl AssistantPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(VersaError::validation("Nothing to update"));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(VersaError::validation("Assistant name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assistant_serializes_only_set_fields() {
        let payload = NewAssistant::new("Writer").with_type(AssistantType::Workflow);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Writer", "type": "workflow"}));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(NewAssistant::new("   ").validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_patch_validation() {
        assert!(AssistantPatch::default().validate().is_err());
        let patch = AssistantPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        let patch = AssistantPatch {
            instructions: Some("Be brief".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
