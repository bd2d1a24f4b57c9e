//! Assistant domain module.

mod model;
mod request;

pub use model::{Assistant, AssistantType, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use request::{AssistantPatch, NewAssistant};
