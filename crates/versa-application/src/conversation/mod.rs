//! Active conversation and message ordering.

mod sync;
mod view;

pub use sync::ConversationSync;
pub use view::{ConversationView, SelectionOutcome, ViewPhase};
