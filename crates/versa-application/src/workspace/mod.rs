//! Workspace entity cache.

mod cache;
mod report;

pub use cache::WorkspaceCache;
pub use report::{LoadReport, WorkspaceEvent};
