//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::config::CrawlSettings;
use crate::state::{QueueState, SiteStatus};
use crate::storage::{
    CrawlHistoryRecord, DocumentRecord, IndexStatistics, NewDocument, NewQueueEntry,
    ProjectRecord, QueueEntry, QueueSnapshotRow, RunCounters, RunStatus, SearchCandidate,
    SearchFilters, SiteRecord, TermPosting,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Site not found: {0}")]
    SiteNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler and the
/// search engine. Implementations are not required to be thread-safe; callers
/// share one instance behind a mutex.
pub trait Store {
    // ===== Projects & Sites =====

    /// Creates a new project with its domain allow-list and crawl settings
    ///
    /// # Returns
    ///
    /// The ID of the newly created project
    fn create_project(
        &mut self,
        name: &str,
        base_domains: &[String],
        settings: &CrawlSettings,
    ) -> StorageResult<i64>;

    /// Gets a project by ID
    fn get_project(&self, project_id: i64) -> StorageResult<Option<ProjectRecord>>;

    /// Gets a project by its unique name
    fn get_project_by_name(&self, name: &str) -> StorageResult<Option<ProjectRecord>>;

    /// Registers a site under a project
    ///
    /// # Returns
    ///
    /// The ID of the newly created site
    fn create_site(&mut self, project_id: i64, domain: &str, base_url: &str)
        -> StorageResult<i64>;

    /// Gets a site by ID
    fn get_site(&self, site_id: i64) -> StorageResult<Option<SiteRecord>>;

    /// Finds a site by its base URL
    fn find_site_by_url(&self, base_url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Lists all sites, most recently crawled first
    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Atomically claims a site for a crawl run
    ///
    /// Flips status to `processing` only if the site is currently crawlable.
    /// Returns false when another run holds the claim (or the site is
    /// blocked); the caller surfaces that as a conflict.
    fn claim_site(&mut self, site_id: i64) -> StorageResult<bool>;

    /// Releases a claimed site into a final status and stamps last_crawled
    fn finish_site(&mut self, site_id: i64, status: SiteStatus) -> StorageResult<()>;

    // ===== Crawl Queue =====

    /// Inserts a queue entry unless its (project, url identity) already exists
    ///
    /// # Returns
    ///
    /// true if a new row was inserted, false if it was already enqueued
    fn enqueue(&mut self, entry: &NewQueueEntry) -> StorageResult<bool>;

    /// Resets a site's non-pending queue entries back to pending
    ///
    /// Runs at the start of a crawl so that a new run revisits every known
    /// URL of the site. Returns the number of entries reset.
    fn reset_site_queue(&mut self, site_id: i64) -> StorageResult<u64>;

    /// Claims the next pending entry for a site
    ///
    /// Highest priority first, FIFO within a priority tier. The returned
    /// entry has already been marked `processing`.
    fn claim_next_pending(&mut self, site_id: i64) -> StorageResult<Option<QueueEntry>>;

    /// Moves a claimed entry into a terminal state and stamps processed_at
    fn mark_queue_entry(
        &mut self,
        entry_id: i64,
        status: QueueState,
        error: Option<&str>,
    ) -> StorageResult<()>;

    /// Counts a site's queue entries in a given state
    fn count_queue_entries(&self, site_id: i64, status: QueueState) -> StorageResult<u64>;

    /// Returns a queue snapshot, priority desc then oldest first
    fn queue_snapshot(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<QueueSnapshotRow>>;

    // ===== Documents =====

    /// Checks whether a document with this URL identity already exists
    fn document_exists(&self, url_hash: &str) -> StorageResult<bool>;

    /// Persists a parsed document
    ///
    /// # Returns
    ///
    /// The ID of the newly created document
    fn insert_document(&mut self, doc: &NewDocument) -> StorageResult<i64>;

    /// Lists all documents of a site (for reindexing)
    fn list_documents_for_site(&self, site_id: i64) -> StorageResult<Vec<DocumentRecord>>;

    /// Lists all documents of a project (for reindexing)
    fn list_documents_for_project(&self, project_id: i64) -> StorageResult<Vec<DocumentRecord>>;

    /// Counts documents belonging to a site
    fn count_documents_for_site(&self, site_id: i64) -> StorageResult<u64>;

    // ===== Term Index =====

    /// Replaces all postings of a document in one transaction
    ///
    /// Delete-then-insert, so reindexing a document is idempotent.
    fn replace_document_terms(
        &mut self,
        document_id: i64,
        project_id: i64,
        postings: &[TermPosting],
    ) -> StorageResult<()>;

    /// Counts postings currently stored for a document
    fn count_document_terms(&self, document_id: i64) -> StorageResult<u64>;

    /// Deletes postings whose document no longer exists
    ///
    /// # Returns
    ///
    /// The number of orphaned postings removed
    fn delete_orphan_postings(&mut self) -> StorageResult<u64>;

    /// Refreshes SQLite's query planner statistics
    fn analyze(&mut self) -> StorageResult<()>;

    /// Returns aggregate statistics about the index
    fn index_statistics(&self) -> StorageResult<IndexStatistics>;

    // ===== Search =====

    /// Retrieves documents matching at least one pattern, with filters
    ///
    /// Each pattern is a SQL LIKE pattern matched against title, description
    /// and content; filters are conjunctive. All values are bound parameters.
    fn search_candidates(
        &self,
        patterns: &[String],
        filters: &SearchFilters,
    ) -> StorageResult<Vec<SearchCandidate>>;

    /// Simple substring retrieval used by the fallback search path
    ///
    /// Newest first, capped at `limit`.
    fn fallback_candidates(
        &self,
        pattern: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> StorageResult<Vec<SearchCandidate>>;

    /// Document counts grouped by content type
    fn facet_content_types(&self, project_id: Option<i64>) -> StorageResult<Vec<(String, u64)>>;

    /// Document counts grouped by project name
    fn facet_projects(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Document counts for the top sites by volume
    fn facet_sites(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<(String, u64)>>;

    /// Indexed terms matching a pattern, by total frequency
    fn suggest_terms(
        &self,
        pattern: &str,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<String>>;

    /// Document titles matching a pattern, by pagerank then recency
    fn suggest_titles(
        &self,
        pattern: &str,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<String>>;

    // ===== Crawl History =====

    /// Opens a run record at crawl start
    ///
    /// # Returns
    ///
    /// The ID of the new history row
    fn start_history(&mut self, project_id: i64, site_id: i64) -> StorageResult<i64>;

    /// Finalizes a run record with its counters and outcome
    fn finalize_history(
        &mut self,
        history_id: i64,
        counters: &RunCounters,
        status: RunStatus,
        error_details: Option<&str>,
    ) -> StorageResult<()>;

    /// Lists run records, newest first
    fn list_history(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<CrawlHistoryRecord>>;
}
