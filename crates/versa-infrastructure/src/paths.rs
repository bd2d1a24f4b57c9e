//! Unified path management for versa configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/versa/             # Config directory
//! ├── config.toml              # Client configuration
//! └── session.toml             # Persisted session (token, user, workspace)
//! ```

use std::path::PathBuf;
use versa_core::error::{Result, VersaError};

const APP_DIR: &str = "versa";

/// Files managed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// Client configuration (`config.toml`)
    Config,
    /// Persisted session (`session.toml`)
    Session,
}

impl ServiceType {
    fn file_name(&self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::Session => "session.toml",
        }
    }
}

/// Resolves where versa keeps its files.
///
/// A base directory can be injected for tests; otherwise the platform config
/// directory (`dirs::config_dir()`) is used.
#[derive(Debug, Clone, Default)]
pub struct VersaPaths {
    base_dir: Option<PathBuf>,
}

impl VersaPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the versa configuration directory (e.g. `~/.config/versa/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VersaError::config("Cannot find config directory"))
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(service.file_name()))
    }
}
