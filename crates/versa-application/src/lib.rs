//! Application layer for VERSA.
//!
//! State machines and ordering rules of the client: the session lifecycle,
//! the workspace entity cache and the active conversation. Everything here
//! talks to the backend through [`versa_core::api::ApiGateway`] and to disk
//! through [`versa_core::persistence::PersistencePort`].

pub mod client;
pub mod conversation;
pub mod session;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use client::VersaClient;
pub use conversation::{ConversationSync, ConversationView, SelectionOutcome, ViewPhase};
pub use session::{LOGIN_FALLBACK, REGISTER_FALLBACK, SessionEvent, SessionManager, SessionSnapshot};
pub use workspace::{LoadReport, WorkspaceCache, WorkspaceEvent};
