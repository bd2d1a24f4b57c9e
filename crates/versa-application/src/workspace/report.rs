use versa_core::error::{Result, VersaError};

/// Outcome of [`WorkspaceCache::load_all`](super::WorkspaceCache::load_all).
///
/// Each list carries its own result so a partial failure still populates
/// the list that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub workspace_id: String,
    /// Number of assistants loaded
    pub assistants: Result<usize>,
    /// Number of conversations loaded
    pub conversations: Result<usize>,
    /// The results arrived after the workspace changed and were dropped
    pub discarded: bool,
}

impl LoadReport {
    pub(crate) fn discarded(workspace_id: String) -> Self {
        let superseded = || Err(VersaError::busy("Workspace load was superseded"));
        Self {
            workspace_id,
            assistants: superseded(),
            conversations: superseded(),
            discarded: true,
        }
    }

    /// Both lists loaded and applied.
    pub fn is_complete(&self) -> bool {
        !self.discarded && self.assistants.is_ok() && self.conversations.is_ok()
    }

    pub fn errors(&self) -> Vec<&VersaError> {
        [&self.assistants, &self.conversations]
            .into_iter()
            .filter_map(|result| result.as_ref().err())
            .collect()
    }
}

/// Changes to the cached workspace that other components mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Fresh lists for this workspace are in place
    Reloaded { workspace_id: String },
    Cleared,
    /// These conversations no longer exist
    ConversationsRemoved(Vec<String>),
}
