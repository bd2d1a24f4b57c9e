use versa_core::conversation::Message;

/// Where the on-screen conversation is in its lifecycle.
///
/// `Idle → LoadingMessages → Ready`, and `Ready → SendingMessage → Ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewPhase {
    #[default]
    Idle,
    LoadingMessages,
    Ready,
    SendingMessage,
}

/// The conversation on screen and its messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationView {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    pub phase: ViewPhase,
}

impl ConversationView {
    pub fn shows(&self, conversation_id: &str) -> bool {
        self.conversation_id.as_deref() == Some(conversation_id)
    }

    /// History has arrived for the conversation on screen.
    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, ViewPhase::Ready | ViewPhase::SendingMessage)
    }
}

/// Result of [`ConversationSync::select_conversation`](super::ConversationSync::select_conversation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Loaded {
        conversation_id: String,
        count: usize,
    },
    AlreadyLoaded {
        conversation_id: String,
    },
    /// A newer selection was made before the history arrived
    Superseded,
    /// No id was given and the workspace has no conversations
    NothingToSelect,
}
