//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `model`: `Conversation` and the recency ordering helpers
//! - `message`: `Message`, `MessageRole` and the send response pair
//! - `request`: create/update/send payloads

mod message;
mod model;
mod request;

pub use message::{Message, MessageExchange, MessageRole};
pub use model::{
    Conversation, ConversationStatus, DEFAULT_CONVERSATION_TITLE, is_sorted_by_recency,
    sort_by_recency,
};
pub use request::{ConversationPatch, NewConversation, SendMessageRequest};
