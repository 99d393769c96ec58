//! Configuration module for Loupe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use loupe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("loupe.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSettings, CrawlerConfig, DatabaseConfig, SearchConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_or_default, load_config_with_hash};

// Re-export validation helpers used at registration boundaries
pub use validation::{validate_crawl_settings, validate_domain};
