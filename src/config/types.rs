use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Loupe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Default crawl settings applied to projects that do not override them
    pub fn default_crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            max_depth: self.crawler.max_depth,
            crawl_delay: Duration::from_millis(self.crawler.crawl_delay_ms),
            respect_robots: self.crawler.respect_robots,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Crawler behavior configuration
///
/// These values act as defaults for newly registered projects and as global
/// bounds for the fetch client.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from the site's base URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Politeness delay between consecutive requests (milliseconds)
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,

    /// Page budget for a run when the caller does not pass one
    #[serde(rename = "default-max-pages", default = "default_max_pages")]
    pub default_max_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest response body kept, in bytes; larger bodies are truncated
    /// and a larger declared Content-Length fails the fetch
    #[serde(rename = "max-content-length", default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Outbound links collected per page
    #[serde(rename = "max-links-per-page", default = "default_max_links")]
    pub max_links_per_page: usize,

    /// Whether new projects consult robots.txt (advisory)
    #[serde(rename = "respect-robots", default)]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            crawl_delay_ms: default_crawl_delay_ms(),
            default_max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout(),
            max_content_length: default_max_content_length(),
            max_links_per_page: default_max_links(),
            respect_robots: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version of the crawler
    #[serde(default = "default_agent_version")]
    pub version: String,

    /// Optional URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Full user agent string sent with every request
    pub fn agent_string(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.name, self.version, url),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

/// Search behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Results per page when the caller does not pass one
    #[serde(rename = "default-per-page", default = "default_per_page")]
    pub default_per_page: u32,

    /// Hard cap on results per page
    #[serde(rename = "max-per-page", default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Target snippet length in characters
    #[serde(rename = "snippet-length", default = "default_snippet_length")]
    pub snippet_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            snippet_length: default_snippet_length(),
        }
    }
}

/// Typed per-project crawl settings
///
/// Validated once when a project is registered; the orchestrator honors
/// max_depth and crawl_delay unconditionally, respect_robots is advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSettings {
    pub max_depth: u32,
    pub crawl_delay: Duration,
    pub respect_robots: bool,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            crawl_delay: Duration::from_millis(default_crawl_delay_ms()),
            respect_robots: false,
        }
    }
}

fn default_database_path() -> String {
    "./loupe.db".to_string()
}

fn default_max_depth() -> u32 {
    3
}

fn default_crawl_delay_ms() -> u64 {
    1000
}

fn default_max_pages() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_content_length() -> usize {
    1_000_000
}

fn default_max_links() -> usize {
    50
}

fn default_agent_name() -> String {
    "SearchBot".to_string()
}

fn default_agent_version() -> String {
    "1.0".to_string()
}

fn default_per_page() -> u32 {
    20
}

fn default_max_per_page() -> u32 {
    100
}

fn default_snippet_length() -> usize {
    300
}
