//! Persistence port implementations.
//!
//! `FileSessionStore` keeps every key in one TOML table so a group write is a
//! single atomic file replacement. `InMemorySessionStore` is for tests and
//! for running without a writable home directory.

use crate::storage::AtomicTomlFile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use versa_core::error::Result;
use versa_core::persistence::PersistencePort;

/// On-disk layout of the session file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// File-backed key/value store.
pub struct FileSessionStore {
    file: AtomicTomlFile<SessionFile>,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        tracing::debug!("[FileSessionStore] Using session file {:?}", path);
        Self {
            file: AtomicTomlFile::new(path),
        }
    }
}

impl PersistencePort for FileSessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .file
            .load()?
            .and_then(|mut file| file.entries.remove(key)))
    }

    fn write_group(&self, entries: &[(&str, String)]) -> Result<()> {
        self.file.update(SessionFile::default(), |file| {
            for (key, value) in entries {
                file.entries.insert((*key).to_string(), value.clone());
            }
            Ok(())
        })
    }

    fn clear_group(&self, keys: &[&str]) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        self.file.update(SessionFile::default(), |file| {
            for key in keys {
                file.entries.remove(*key);
            }
            Ok(())
        })
    }
}

/// Process-local key/value store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistencePort for InMemorySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write_group(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn clear_group(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use versa_core::persistence::{PersistedSession, SESSION_KEYS, TOKEN_KEY};
    use versa_core::user::User;
    use versa_core::workspace::Workspace;

    fn session() -> PersistedSession {
        PersistedSession {
            token: "tok1".to_string(),
            user: User::new("u1", "Ann", "a@b.com"),
            workspace: Workspace::new("w1", "Ann's Workspace"),
        }
    }

    #[test]
    fn test_file_store_round_trips_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.toml");

        session().save(&FileSessionStore::new(path.clone())).unwrap();

        // A fresh handle sees what the previous one wrote.
        let reopened = FileSessionStore::new(path);
        assert_eq!(PersistedSession::load(&reopened).unwrap(), Some(session()));
    }

    #[test]
    fn test_file_store_clear_group() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.toml"));
        session().save(&store).unwrap();
        store.write("theme", "dark").unwrap();

        PersistedSession::clear(&store).unwrap();

        for key in SESSION_KEYS {
            assert_eq!(store.read(key).unwrap(), None);
        }
        assert_eq!(store.read("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_clearing_missing_file_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.toml");
        let store = FileSessionStore::new(path.clone());

        store.clear_group(&SESSION_KEYS).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty());

        store.write(TOKEN_KEY, "tok1").unwrap();
        assert_eq!(store.read(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));

        store.clear(TOKEN_KEY).unwrap();
        assert!(store.is_empty());
    }
}
