use tracing::info;

use crate::actors::FetchOrchestrator;
use crate::config::ConfigStore;
use crate::error::Result;
use crate::models::{Configuration, RepositoryKind};

/// Persists settings edits, then tells the orchestrator
///
/// A rejected edit never reaches the store or the orchestrator.
#[derive(Clone)]
pub struct SettingsController {
    config: ConfigStore,
    orchestrator: FetchOrchestrator,
}

impl SettingsController {
    pub fn new(config: ConfigStore, orchestrator: FetchOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn save_target_name(&self, name: &str) -> Result<()> {
        self.config.set_target_name(name)?;
        let name = self.config.target_name();
        info!(target_name = %name, "Saved target name");
        self.orchestrator.on_target_name_changed(name);
        Ok(())
    }

    /// Save the built-in default name and return it
    pub fn restore_default_target_name(&self) -> Result<String> {
        self.config.reset_target_name()?;
        let name = self.config.target_name();
        info!(target_name = %name, "Restored default target name");
        self.orchestrator.on_target_name_changed(name.clone());
        Ok(name)
    }

    pub fn save_kind(&self, kind: RepositoryKind) -> Result<()> {
        self.config.set_kind(kind)?;
        info!(%kind, "Saved repository kind");
        self.orchestrator.on_kind_changed(kind);
        Ok(())
    }

    pub fn save_token(&self, token: Option<&str>) -> Result<()> {
        self.config.set_token(token)?;
        let token = self.config.token();
        info!(authenticated = token.is_some(), "Saved access token");
        self.orchestrator.on_token_changed(token);
        Ok(())
    }

    pub fn configuration(&self) -> Configuration {
        self.config.configuration()
    }
}
