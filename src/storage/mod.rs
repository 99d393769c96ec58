//! Storage module for the crawl index
//!
//! This module handles all database operations for the crawler and the search
//! engine, including:
//! - SQLite database initialization and schema management
//! - Project and site registration
//! - Crawl queue management and run history
//! - Document persistence and the inverted term index
//! - Candidate retrieval, facets and suggestions for search

mod schema;
mod sqlite;
mod traits;

pub use schema::{get_schema_version, initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Store, StorageError, StorageResult};

use crate::config::CrawlSettings;
use crate::state::{QueueState, SiteStatus};
use crate::LoupeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(LoupeError)` - Failed to open or initialize the database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, LoupeError> {
    SqliteStorage::new(path)
}

/// JSON shape of per-project crawl settings as stored in the projects table
///
/// [`CrawlSettings`] carries a `Duration`, which has no stable serde form, so
/// rows store this millisecond-based mirror instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettingsJson {
    pub max_depth: u32,
    pub crawl_delay_ms: u64,
    pub respect_robots: bool,
}

impl Default for CrawlSettingsJson {
    fn default() -> Self {
        Self::from(&CrawlSettings::default())
    }
}

impl From<&CrawlSettings> for CrawlSettingsJson {
    fn from(settings: &CrawlSettings) -> Self {
        Self {
            max_depth: settings.max_depth,
            crawl_delay_ms: settings.crawl_delay.as_millis() as u64,
            respect_robots: settings.respect_robots,
        }
    }
}

impl From<CrawlSettingsJson> for CrawlSettings {
    fn from(json: CrawlSettingsJson) -> Self {
        Self {
            max_depth: json.max_depth,
            crawl_delay: Duration::from_millis(json.crawl_delay_ms),
            respect_robots: json.respect_robots,
        }
    }
}

/// Represents a search project in the database
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    pub base_domains: Vec<String>,
    pub crawl_settings: CrawlSettings,
    pub created_at: String,
}

/// Represents a registered site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub project_id: i64,
    pub domain: String,
    pub base_url: String,
    pub status: SiteStatus,
    pub last_crawled: Option<String>,
    pub crawl_frequency: String,
}

/// A document to be persisted after a successful fetch+parse
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub project_id: i64,
    pub site_id: i64,
    pub url: String,
    pub url_hash: String,
    pub content_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub language: String,
    pub file_size: i64,
    pub quality_score: f64,
    pub metadata: Option<String>,
}

/// Represents an indexed document in the database
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub project_id: i64,
    pub site_id: i64,
    pub url: String,
    pub url_hash: String,
    pub content_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub language: String,
    pub pagerank_score: f64,
    pub quality_score: f64,
    pub indexed_at: String,
}

/// A URL to be enqueued for crawling
#[derive(Debug, Clone)]
pub struct NewQueueEntry {
    pub project_id: i64,
    pub site_id: i64,
    pub url: String,
    pub url_hash: String,
    pub depth: u32,
    pub parent_url: Option<String>,
    pub priority: u32,
}

/// Represents a crawl queue entry in the database
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: i64,
    pub project_id: i64,
    pub site_id: i64,
    pub url: String,
    pub url_hash: String,
    pub depth: u32,
    pub parent_url: Option<String>,
    pub priority: u32,
    pub status: QueueState,
    pub last_error: Option<String>,
    pub scheduled_at: String,
    pub processed_at: Option<String>,
}

/// One row of the queue snapshot report
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshotRow {
    pub url: String,
    pub project_name: Option<String>,
    pub status: QueueState,
    pub priority: u32,
    pub depth: u32,
    pub scheduled_at: String,
}

/// A term posting produced by the indexer for one document
#[derive(Debug, Clone, PartialEq)]
pub struct TermPosting {
    pub term: String,
    pub term_hash: String,
    pub frequency: u32,
    pub weight: f64,
    pub field: String,
    pub context: Option<String>,
}

/// Status of a crawl run as recorded in crawl_history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Per-run counters persisted into crawl_history
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCounters {
    pub urls_discovered: u64,
    pub urls_crawled: u64,
    pub urls_successful: u64,
    pub urls_failed: u64,
    pub urls_skipped: u64,
}

/// Represents a crawl run record joined with its project name
#[derive(Debug, Clone, Serialize)]
pub struct CrawlHistoryRecord {
    pub id: i64,
    pub project_id: i64,
    pub project_name: Option<String>,
    pub site_id: i64,
    pub urls_discovered: u64,
    pub urls_crawled: u64,
    pub urls_successful: u64,
    pub urls_failed: u64,
    pub urls_skipped: u64,
    pub status: RunStatus,
    pub error_details: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

/// Aggregate numbers describing the term index
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStatistics {
    pub total_documents: u64,
    pub total_postings: u64,
    pub distinct_terms: u64,
    pub total_occurrences: u64,
}

/// Conjunctive filters applied to search candidate retrieval
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub project_id: Option<i64>,
    pub content_type: Option<String>,
    pub site_id: Option<i64>,
    pub language: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// A document row retrieved for scoring, with its join context
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub id: i64,
    pub project_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub content_type: String,
    pub language: String,
    pub pagerank_score: f64,
    pub quality_score: f64,
    pub indexed_at: String,
    pub project_name: String,
    pub domain: String,
}
