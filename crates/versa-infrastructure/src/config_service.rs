//! Configuration service implementation.
//!
//! Loads `ClientConfig` from `~/.config/versa/config.toml` and applies
//! environment overrides on top.

use crate::paths::{ServiceType, VersaPaths};
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use versa_core::config::ClientConfig;
use versa_core::error::Result;

/// Overrides `base_url`.
pub const ENV_API_URL: &str = "VERSA_API_URL";
/// Overrides `session_file`.
pub const ENV_SESSION_FILE: &str = "VERSA_SESSION_FILE";

#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    paths: VersaPaths,
}

impl ConfigService {
    pub fn new(paths: VersaPaths) -> Self {
        Self { paths }
    }

    /// Loads the configuration file (defaults when missing) and applies
    /// environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let path = self.paths.get_path(ServiceType::Config)?;
        let mut config = AtomicTomlFile::<ClientConfig>::new(path.clone())
            .load()?
            .unwrap_or_else(|| {
                tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
                ClientConfig::default()
            });

        apply_overrides(
            &mut config,
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_SESSION_FILE).ok(),
        );

        tracing::info!("[ConfigService] API base URL: {}", config.base_url);
        Ok(config)
    }

    /// Writes the configuration file.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let path = self.paths.get_path(ServiceType::Config)?;
        AtomicTomlFile::new(path).save(config)
    }

    /// Session file from the config, or the default location.
    pub fn session_file(&self, config: &ClientConfig) -> Result<PathBuf> {
        match &config.session_file {
            Some(path) => Ok(path.clone()),
            None => self.paths.get_path(ServiceType::Session),
        }
    }
}

fn apply_overrides(config: &mut ClientConfig, api_url: Option<String>, session_file: Option<String>) {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config.base_url = url;
    }
    if let Some(file) = session_file.filter(|f| !f.trim().is_empty()) {
        config.session_file = Some(PathBuf::from(file));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_saved_config_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(VersaPaths::new(Some(temp_dir.path().to_path_buf())));
        let config = ClientConfig::default().with_base_url("https://versatil.example/api");

        service.save(&config).unwrap();
        let file = AtomicTomlFile::<ClientConfig>::new(temp_dir.path().join("config.toml"));

        assert_eq!(file.load().unwrap(), Some(config));
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        apply_overrides(&mut config, Some("http://x/api".into()), Some("/tmp/s.toml".into()));
        assert_eq!(config.base_url, "http://x/api");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/s.toml")));

        let mut config = ClientConfig::default();
        apply_overrides(&mut config, Some("  ".into()), None);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_default_session_file_location() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(VersaPaths::new(Some(temp_dir.path().to_path_buf())));

        let path = service.session_file(&ClientConfig::default()).unwrap();

        assert_eq!(path, temp_dir.path().join("session.toml"));
    }
}
