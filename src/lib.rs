//! Fault-Harvest: a polite fault-code reference harvester
//!
//! This crate crawls a paginated wiki category of diagnostic fault codes,
//! extracts each detail page into a structured record, and upserts the
//! records into a local SQLite store that the lookup layer serves queries from.

pub mod config;
pub mod crawler;
pub mod lookup;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Fault-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Invalid query: {0}")]
    Validation(#[from] lookup::ValidationError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },
}

impl FetchError {
    /// The URL the failed request was made against
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Network { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }
}

/// Result type alias for Fault-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSummary};
pub use lookup::{search, QueryGrammar, SearchOutcome};
pub use state::CrawlProgress;
pub use storage::{FaultCodeRecord, FaultCodeStore, SqliteStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_reports_url() {
        let status = FetchError::Status {
            url: "https://wiki.example.com/wiki/00532".to_string(),
            status: 404,
        };
        assert_eq!(status.url(), "https://wiki.example.com/wiki/00532");
        assert_eq!(
            status.to_string(),
            "HTTP 404 for https://wiki.example.com/wiki/00532"
        );

        let timeout = FetchError::Timeout {
            url: "https://wiki.example.com/listing".to_string(),
        };
        assert_eq!(timeout.url(), "https://wiki.example.com/listing");

        let invalid = FetchError::InvalidUrl {
            url: "not a url".to_string(),
            source: ::url::Url::parse("not a url").unwrap_err(),
        };
        assert_eq!(invalid.url(), "not a url");
    }
}
