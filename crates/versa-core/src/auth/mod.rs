//! Authentication types shared by the gateway and the session manager.

mod headers;
mod model;

pub use headers::{AUTHORIZATION, AuthHeaders};
pub use model::{AuthResponse, LoginRequest, RegisterRequest, SessionState};
