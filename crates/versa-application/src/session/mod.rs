//! Session lifecycle.
//!
//! # Module Structure
//!
//! - `manager`: `SessionManager`, the authentication state machine
//! - `snapshot`: the observable `SessionSnapshot` and `SessionEvent`

mod manager;
mod snapshot;

pub use manager::{LOGIN_FALLBACK, REGISTER_FALLBACK, SessionManager};
pub use snapshot::{SessionEvent, SessionSnapshot};
