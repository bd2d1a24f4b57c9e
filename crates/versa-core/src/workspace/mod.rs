pub mod model;

pub use model::{MemberRole, Workspace, WorkspaceMember, WorkspacePatch};
