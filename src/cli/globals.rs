use crate::{
    api::ApiClient,
    auth::AuthController,
    cli::console::ConsoleNotifier,
    config::AppConfig,
    session::{FileStorage, SessionStore},
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Controller over the session file, reporting to the console.
    ///
    /// # Errors
    /// Returns an error if the API base URL is missing or invalid.
    pub fn controller(&self) -> Result<AuthController> {
        let storage = FileStorage::new(&self.config.session_file);
        let store = Arc::new(SessionStore::new(Arc::new(storage)));
        let api = ApiClient::new(&self.config)
            .context("set PARRAIN_API_BASE_URL or pass --api-url")?;

        Ok(AuthController::new(store, api).with_notifier(Arc::new(ConsoleNotifier)))
    }
}
