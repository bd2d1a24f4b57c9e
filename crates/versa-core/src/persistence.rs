//! Persistence port.
//!
//! A small key/value store for the pieces of a session that survive a
//! restart. The three session keys are always written and cleared as one
//! group so a half-written session can never be restored.

use crate::error::Result;
use crate::user::User;
use crate::workspace::Workspace;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";
pub const WORKSPACE_KEY: &str = "auth_workspace";

/// Every key that makes up a persisted session.
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, WORKSPACE_KEY];

/// Durable key/value storage.
///
/// Implementations must apply `write_group` and `clear_group` atomically:
/// either every entry changes or none does.
pub trait PersistencePort: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.write_group(&[(key, value.to_string())])
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.clear_group(&[key])
    }

    fn write_group(&self, entries: &[(&str, String)]) -> Result<()>;

    fn clear_group(&self, keys: &[&str]) -> Result<()>;
}

/// The session as it is stored between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSession {
    pub token: String,
    pub user: User,
    pub workspace: Workspace,
}

impl PersistedSession {
    /// Reads the three session entries.
    ///
    /// Returns `Ok(None)` unless all three are present.
    pub fn load(port: &dyn PersistencePort) -> Result<Option<Self>> {
        let token = port.read(TOKEN_KEY)?;
        let user = port.read(USER_KEY)?;
        let workspace = port.read(WORKSPACE_KEY)?;

        let (Some(token), Some(user), Some(workspace)) = (token, user, workspace) else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            token,
            user: serde_json::from_str(&user)?,
            workspace: serde_json::from_str(&workspace)?,
        }))
    }

    /// Writes all three entries as one group.
    pub fn save(&self, port: &dyn PersistencePort) -> Result<()> {
        let entries = [
            (TOKEN_KEY, self.token.clone()),
            (USER_KEY, serde_json::to_string(&self.user)?),
            (WORKSPACE_KEY, serde_json::to_string(&self.workspace)?),
        ];
        port.write_group(&entries)
    }

    /// Removes all three entries as one group.
    pub fn clear(port: &dyn PersistencePort) -> Result<()> {
        port.clear_group(&SESSION_KEYS)
    }

    /// True if a token is stored, whether or not the rest is.
    pub fn has_token(port: &dyn PersistencePort) -> bool {
        matches!(port.read(TOKEN_KEY), Ok(Some(token)) if !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapPort(Mutex<HashMap<String, String>>);

    impl PersistencePort for MapPort {
        fn read(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn write_group(&self, entries: &[(&str, String)]) -> Result<()> {
            let mut map = self.0.lock().unwrap();
            for (key, value) in entries {
                map.insert(key.to_string(), value.clone());
            }
            Ok(())
        }

        fn clear_group(&self, keys: &[&str]) -> Result<()> {
            let mut map = self.0.lock().unwrap();
            for key in keys {
                map.remove(*key);
            }
            Ok(())
        }
    }

    fn session() -> PersistedSession {
        PersistedSession {
            token: "tok1".into(),
            user: User::new("u1", "Ann", "a@b.com"),
            workspace: Workspace::new("w1", "Ann's Workspace"),
        }
    }

    #[test]
    fn test_save_then_load() {
        let port = MapPort::default();
        session().save(&port).unwrap();
        assert_eq!(PersistedSession::load(&port).unwrap(), Some(session()));
        assert!(PersistedSession::has_token(&port));
    }

    #[test]
    fn test_missing_entry_means_no_session() {
        let port = MapPort::default();
        session().save(&port).unwrap();
        port.clear(WORKSPACE_KEY).unwrap();

        assert_eq!(PersistedSession::load(&port).unwrap(), None);
        assert!(PersistedSession::has_token(&port));
    }

    #[test]
    fn test_clear_removes_every_key() {
        let port = MapPort::default();
        session().save(&port).unwrap();
        PersistedSession::clear(&port).unwrap();

        for key in SESSION_KEYS {
            assert_eq!(port.read(key).unwrap(), None);
        }
    }

    #[test]
    fn test_corrupt_user_is_an_error() {
        let port = MapPort::default();
        session().save(&port).unwrap();
        port.write(USER_KEY, "{not json").unwrap();

        assert!(PersistedSession::load(&port).is_err());
    }
}
