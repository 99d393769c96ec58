//! Loupe: a self-hosted site crawler and full-text search engine
//!
//! This crate crawls registered sites within their configured domain boundaries,
//! extracts and indexes textual content into SQLite, and serves ranked search
//! with faceting, highlighting, and synonym expansion.

pub mod config;
pub mod crawler;
pub mod index;
pub mod report;
pub mod robots;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Loupe operations
#[derive(Debug, Error)]
pub enum LoupeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Site {site_id} is already being crawled")]
    CrawlInProgress { site_id: i64 },

    #[error("Site already registered: {url}")]
    DuplicateSite { url: String },

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crawler::CrawlPhase,
        to: crawler::CrawlPhase,
    },
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

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// Result type alias for Loupe operations
pub type Result<T> = std::result::Result<T, LoupeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use search::{SearchOptions, SearchResponse};
pub use state::{QueueState, SiteStatus};
pub use url::{normalize_url, url_hash};
