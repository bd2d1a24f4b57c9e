use versa_core::auth::{AuthHeaders, SessionState};
use versa_core::persistence::PersistedSession;
use versa_core::user::User;
use versa_core::workspace::Workspace;

/// Point-in-time view of the session, published on the watch channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub token: Option<String>,
    pub user: Option<User>,
    pub workspace: Option<Workspace>,
    /// True while a stored session is being verified or credentials are in flight
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            token: None,
            user: None,
            workspace: None,
            loading: false,
        }
    }

    pub fn initializing() -> Self {
        Self {
            state: SessionState::Initializing,
            loading: true,
            ..Self::anonymous()
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            ..Self::anonymous()
        }
    }

    pub fn authenticated(session: PersistedSession) -> Self {
        Self {
            state: SessionState::Authenticated,
            token: Some(session.token),
            user: Some(session.user),
            workspace: Some(session.workspace),
            loading: false,
        }
    }

    /// Authenticated means token and user are both present.
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated() && self.token.is_some() && self.user.is_some()
    }

    pub fn auth_headers(&self) -> AuthHeaders {
        match &self.token {
            Some(token) => AuthHeaders::bearer(token),
            None => AuthHeaders::none(),
        }
    }
}

/// Session transitions, for observers that react rather than render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    /// A stored session passed verification at startup
    Restored,
    LoggedOut,
    /// A 401 tore the session down; observers should send the user to login
    Expired,
    WorkspaceChanged(String),
    UserUpdated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_headers() {
        let snapshot = SessionSnapshot::anonymous();
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.auth_headers().is_empty());
    }

    #[test]
    fn test_initializing_is_loading() {
        let snapshot = SessionSnapshot::initializing();
        assert!(snapshot.loading);
        assert!(!snapshot.is_authenticated());
    }
}
