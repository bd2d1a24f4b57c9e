pub mod assistants;
pub mod auth;
pub mod context;
pub mod conversations;
pub mod messages;
pub mod workspaces;
