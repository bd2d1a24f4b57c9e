use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow, bail};
use versa_application::VersaClient;
use versa_core::config::ClientConfig;
use versa_core::error::VersaError;
use versa_infrastructure::{ConfigService, FileSessionStore, VersaPaths};
use versa_interaction::HttpApiGateway;

/// Everything a command needs: the configured client and where it keeps
/// its session.
pub struct Context {
    pub client: VersaClient,
    pub config: ClientConfig,
    pub session_file: PathBuf,
}

impl Context {
    pub fn build(api_url: Option<String>) -> Result<Self> {
        let service = ConfigService::new(VersaPaths::new(None));
        let mut config = service.load().context("Failed to load configuration")?;
        if let Some(api_url) = api_url {
            config = config.with_base_url(api_url);
        }

        let session_file = service
            .session_file(&config)
            .context("Failed to resolve session file")?;
        let gateway = HttpApiGateway::new(&config)?;
        let store = FileSessionStore::new(session_file.clone());
        tracing::debug!(
            "[CLI] API {} (session file {})",
            gateway.base_url(),
            session_file.display()
        );

        Ok(Self {
            client: VersaClient::new(Arc::new(gateway), Arc::new(store)),
            config,
            session_file,
        })
    }

    /// Restores the stored session and loads its workspace.
    pub async fn signed_in(&self) -> Result<()> {
        let state = self.client.start().await;
        tracing::debug!("[CLI] Session state: {:?}", state);
        if !state.is_authenticated() {
            bail!("Not signed in. Run `versa login` first.");
        }
        Ok(())
    }
}

/// Turns a client error into the text a user should see.
pub fn failure(err: VersaError, fallback: &str) -> anyhow::Error {
    anyhow!(err.user_message(fallback))
}
