//! Shared wiring for CLI commands: config -> store -> auth -> gate.

use anyhow::Context;
use std::sync::Arc;

use crate::auth::{RestAuth, SessionGate, SessionHandle};
use crate::config;
use crate::content::FormInput;
use crate::manager::ListManager;
use crate::repository::Repository;
use crate::store::{ContentStore, RestStore};

pub struct CliContext {
    pub gate: SessionGate,
    store: Arc<dyn ContentStore>,
}

impl CliContext {
    /// Build the component stack from the environment config and restore any
    /// persisted session before the command runs.
    pub async fn connect() -> anyhow::Result<Self> {
        let cfg = config::config();
        anyhow::ensure!(
            !cfg.store.base_url.is_empty(),
            "store URL is not configured (set FOLIO_STORE_URL)"
        );
        anyhow::ensure!(
            !cfg.store.api_key.is_empty(),
            "store API key is not configured (set FOLIO_STORE_API_KEY)"
        );

        let handle = SessionHandle::new();
        let store: Arc<dyn ContentStore> = Arc::new(
            RestStore::from_config(&cfg.store, handle.clone())
                .context("failed to build store client")?,
        );
        let auth = Arc::new(
            RestAuth::from_config(&cfg.store, &cfg.auth)
                .context("failed to build auth client")?,
        );

        let gate = SessionGate::new(auth, store.clone(), handle);
        gate.restore().await.context("failed to restore session")?;
        Ok(Self { gate, store })
    }

    pub fn manager<I: FormInput + 'static>(&self) -> ListManager<I> {
        ListManager::new(Repository::new(self.store.clone(), self.gate.clone()))
    }
}
