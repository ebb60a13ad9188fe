pub mod actors;
pub mod config;
pub mod deep_link;
pub mod error;
pub mod github;
pub mod models;
pub mod observable;
pub mod settings;
pub mod store;
pub mod types;

pub use actors::FetchOrchestrator;
pub use config::ConfigStore;
pub use deep_link::{DeepLinkHandler, DeepLinkRouter, DeepLinkTarget, RouteOutcome};
pub use error::{RepoBrowserError, Result};
pub use github::{GitHubClient, RepositoryFetcher};
pub use models::{Configuration, FetchStatus, OrchestratorStats, RepositoryKind, RepositorySummary};
pub use observable::{Observable, ReadOnlyObservable, Subscription};
pub use settings::SettingsController;
pub use store::{FileStore, KeyValueStore, MemoryStore};
