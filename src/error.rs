use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoBrowserError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Orchestrator error: {0}")]
    OrchestratorError(String),
}

pub type Result<T> = std::result::Result<T, RepoBrowserError>;
