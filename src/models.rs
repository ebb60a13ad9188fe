use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RepoBrowserError;

/// Repository as shown in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: Option<String>,
    pub star_count: u32,
}

impl RepositorySummary {
    pub fn new(name: impl Into<String>, description: Option<&str>, star_count: u32) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            star_count,
        }
    }
}

/// Whether the target is listed through the organization or the user endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryKind {
    #[default]
    Organization,
    User,
}

impl RepositoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryKind::Organization => "organization",
            RepositoryKind::User => "user",
        }
    }

    /// Path segment of the GitHub listing endpoint
    pub fn endpoint_segment(&self) -> &'static str {
        match self {
            RepositoryKind::Organization => "orgs",
            RepositoryKind::User => "users",
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryKind {
    type Err = RepoBrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organization" | "org" | "orgs" => Ok(RepositoryKind::Organization),
            "user" | "users" => Ok(RepositoryKind::User),
            other => Err(RepoBrowserError::ValidationError(format!(
                "Unknown repository kind: {}",
                other
            ))),
        }
    }
}

/// Snapshot of the three persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub target_name: String,
    pub kind: RepositoryKind,
    pub token: Option<String>,
}

/// Published state of the most recent fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading {
        request_id: u64,
    },
    Loaded {
        request_id: u64,
        count: usize,
        at: DateTime<Utc>,
    },
    Failed {
        request_id: u64,
        message: String,
        at: DateTime<Utc>,
    },
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchStatus::Failed { .. })
    }
}

/// Counters kept by the fetch orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStats {
    pub issued: u64,
    pub completed: u64,
    pub published: u64,
    pub discarded: u64,
    pub failed: u64,
    pub last_published_at: Option<DateTime<Utc>>,
}
