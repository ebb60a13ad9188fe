//! Typed access to the persisted settings
//!
//! [`ConfigStore`] is the only component that reads or writes the underlying
//! [`KeyValueStore`]. Setters persist and return; they never trigger a fetch.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{RepoBrowserError, Result};
use crate::models::{Configuration, RepositoryKind};
use crate::store::KeyValueStore;

pub const TARGET_NAME_KEY: &str = "repositoryName";
pub const TARGET_KIND_KEY: &str = "repositoryType";
pub const TOKEN_KEY: &str = "authorisationToken";

/// Target listed when nothing has been saved yet
pub const DEFAULT_TARGET_NAME: &str = "swiftlang";
pub const DEFAULT_TARGET_KIND: RepositoryKind = RepositoryKind::Organization;

#[derive(Clone)]
pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConfigStore {
    /// Wrap `store`, seeding the target name and kind if they are absent
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let config = Self { store };
        config.seed_defaults()?;
        Ok(config)
    }

    fn seed_defaults(&self) -> Result<()> {
        if self.store.get_string(TARGET_NAME_KEY).is_none() {
            info!(target_name = DEFAULT_TARGET_NAME, "Seeding default target name");
            self.store.set_string(TARGET_NAME_KEY, DEFAULT_TARGET_NAME)?;
        }
        if self.store.get_string(TARGET_KIND_KEY).is_none() {
            info!(kind = %DEFAULT_TARGET_KIND, "Seeding default target kind");
            self.store.set_string(TARGET_KIND_KEY, DEFAULT_TARGET_KIND.as_str())?;
        }
        Ok(())
    }

    pub fn target_name(&self) -> String {
        self.store
            .get_string(TARGET_NAME_KEY)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_NAME.to_string())
    }

    /// Persist a new target name, trimmed; empty or blank names are rejected
    pub fn set_target_name(&self, name: &str) -> Result<()> {
        validate_target_name(name)?;
        self.store.set_string(TARGET_NAME_KEY, name.trim())
    }

    pub fn reset_target_name(&self) -> Result<()> {
        self.store.set_string(TARGET_NAME_KEY, DEFAULT_TARGET_NAME)
    }

    pub fn kind(&self) -> RepositoryKind {
        match self.store.get_string(TARGET_KIND_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored repository kind {:?}: {}", raw, e);
                DEFAULT_TARGET_KIND
            }),
            None => DEFAULT_TARGET_KIND,
        }
    }

    pub fn set_kind(&self, kind: RepositoryKind) -> Result<()> {
        self.store.set_string(TARGET_KIND_KEY, kind.as_str())
    }

    pub fn token(&self) -> Option<String> {
        self.store.get_string(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// `None` or an empty string clears the stored token
    pub fn set_token(&self, token: Option<&str>) -> Result<()> {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => self.store.set_string(TOKEN_KEY, token),
            None => self.store.remove(TOKEN_KEY),
        }
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            target_name: self.target_name(),
            kind: self.kind(),
            token: self.token(),
        }
    }
}

pub fn validate_target_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RepoBrowserError::ValidationError(
            "Target name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fresh() -> (Arc<MemoryStore>, ConfigStore) {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::new(store.clone()).unwrap();
        (store, config)
    }

    #[test]
    fn test_seeds_defaults_into_store() {
        let (store, config) = fresh();

        assert_eq!(store.get_string(TARGET_NAME_KEY).as_deref(), Some(DEFAULT_TARGET_NAME));
        assert_eq!(store.get_string(TARGET_KIND_KEY).as_deref(), Some("organization"));
        assert_eq!(config.target_name(), DEFAULT_TARGET_NAME);
        assert_eq!(config.kind(), RepositoryKind::Organization);
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_does_not_overwrite_existing_values() {
        let store = Arc::new(MemoryStore::new());
        store.set_string(TARGET_NAME_KEY, "acme").unwrap();
        store.set_string(TARGET_KIND_KEY, "user").unwrap();

        let config = ConfigStore::new(store).unwrap();
        assert_eq!(config.target_name(), "acme");
        assert_eq!(config.kind(), RepositoryKind::User);
    }

    #[test]
    fn test_empty_name_is_rejected_and_previous_kept() {
        let (store, config) = fresh();
        config.set_target_name("acme").unwrap();

        let err = config.set_target_name("").unwrap_err();
        assert!(matches!(err, RepoBrowserError::ValidationError(_)));
        assert!(config.set_target_name("   ").is_err());

        assert_eq!(config.target_name(), "acme");
        assert_eq!(store.get_string(TARGET_NAME_KEY).as_deref(), Some("acme"));
    }

    #[test]
    fn test_target_name_is_stored_trimmed() {
        let (store, config) = fresh();

        config.set_target_name("  acme \n").unwrap();

        assert_eq!(store.get_string(TARGET_NAME_KEY).as_deref(), Some("acme"));
        assert_eq!(config.target_name(), "acme");
    }

    #[test]
    fn test_token_set_and_clear() {
        let (store, config) = fresh();

        config.set_token(Some("ghp_abc")).unwrap();
        assert_eq!(config.token().as_deref(), Some("ghp_abc"));

        config.set_token(Some("")).unwrap();
        assert_eq!(config.token(), None);
        assert_eq!(store.get_string(TOKEN_KEY), None);

        config.set_token(Some("ghp_def")).unwrap();
        config.set_token(None).unwrap();
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_unparseable_kind_falls_back_to_default() {
        let (store, config) = fresh();
        store.set_string(TARGET_KIND_KEY, "team").unwrap();

        assert_eq!(config.kind(), DEFAULT_TARGET_KIND);
    }

    #[test]
    fn test_reset_target_name_and_snapshot() {
        let (_store, config) = fresh();
        config.set_target_name("rust-lang").unwrap();
        config.set_kind(RepositoryKind::User).unwrap();
        config.reset_target_name().unwrap();

        let snapshot = config.configuration();
        assert_eq!(snapshot.target_name, DEFAULT_TARGET_NAME);
        assert_eq!(snapshot.kind, RepositoryKind::User);
        assert_eq!(snapshot.token, None);
    }
}
