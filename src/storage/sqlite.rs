//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::config::CrawlSettings;
use crate::state::{QueueState, SiteStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageResult, Store};
use crate::storage::{
    CrawlHistoryRecord, CrawlSettingsJson, DocumentRecord, IndexStatistics, NewDocument,
    NewQueueEntry, ProjectRecord, QueueEntry, QueueSnapshotRow, RunCounters, RunStatus,
    SearchCandidate, SearchFilters, SiteRecord, TermPosting,
};
use crate::LoupeError;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(LoupeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, LoupeError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, LoupeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

// ===== Row mapping helpers =====

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRecord> {
    let base_domains: String = row.get(2)?;
    let settings: String = row.get(3)?;
    Ok(ProjectRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        base_domains: serde_json::from_str(&base_domains).unwrap_or_default(),
        crawl_settings: serde_json::from_str::<CrawlSettingsJson>(&settings)
            .unwrap_or_default()
            .into(),
        created_at: row.get(4)?,
    })
}

fn site_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        domain: row.get(2)?,
        base_url: row.get(3)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(SiteStatus::Error),
        last_crawled: row.get(5)?,
        crawl_frequency: row.get(6)?,
    })
}

fn queue_entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueueEntry> {
    Ok(QueueEntry {
        id: row.get(0)?,
        project_id: row.get(1)?,
        site_id: row.get(2)?,
        url: row.get(3)?,
        url_hash: row.get(4)?,
        depth: row.get(5)?,
        parent_url: row.get(6)?,
        priority: row.get(7)?,
        status: QueueState::from_db_string(&row.get::<_, String>(8)?)
            .unwrap_or(QueueState::Failed),
        last_error: row.get(9)?,
        scheduled_at: row.get(10)?,
        processed_at: row.get(11)?,
    })
}

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        site_id: row.get(2)?,
        url: row.get(3)?,
        url_hash: row.get(4)?,
        content_type: row.get(5)?,
        title: row.get(6)?,
        description: row.get(7)?,
        content: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        language: row.get(9)?,
        pagerank_score: row.get(10)?,
        quality_score: row.get(11)?,
        indexed_at: row.get(12)?,
    })
}

fn candidate_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchCandidate> {
    Ok(SearchCandidate {
        id: row.get(0)?,
        project_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        content: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        content_type: row.get(6)?,
        language: row.get(7)?,
        pagerank_score: row.get(8)?,
        quality_score: row.get(9)?,
        indexed_at: row.get(10)?,
        project_name: row.get(11)?,
        domain: row.get(12)?,
    })
}

fn history_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CrawlHistoryRecord> {
    Ok(CrawlHistoryRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        project_name: row.get(2)?,
        site_id: row.get(3)?,
        urls_discovered: row.get::<_, i64>(4)? as u64,
        urls_crawled: row.get::<_, i64>(5)? as u64,
        urls_successful: row.get::<_, i64>(6)? as u64,
        urls_failed: row.get::<_, i64>(7)? as u64,
        urls_skipped: row.get::<_, i64>(8)? as u64,
        status: RunStatus::from_db_string(&row.get::<_, String>(9)?)
            .unwrap_or(RunStatus::Failed),
        error_details: row.get(10)?,
        started_at: row.get(11)?,
        completed_at: row.get(12)?,
    })
}

const CANDIDATE_SELECT: &str = "SELECT d.id, d.project_id, d.url, d.title, d.description,
        d.content, d.content_type, d.language, d.pagerank_score, d.quality_score,
        d.indexed_at, p.name, s.domain
 FROM documents d
 JOIN projects p ON p.id = d.project_id
 JOIN sites s ON s.id = d.site_id";

const DOCUMENT_SELECT: &str = "SELECT id, project_id, site_id, url, url_hash, content_type,
        title, description, content, language, pagerank_score, quality_score, indexed_at
 FROM documents";

const SITE_SELECT: &str =
    "SELECT id, project_id, domain, base_url, status, last_crawled, crawl_frequency FROM sites";

const QUEUE_SELECT: &str = "SELECT id, project_id, site_id, url, url_hash, depth, parent_url,
        priority, status, last_error, scheduled_at, processed_at
 FROM crawl_queue";

const HISTORY_SELECT: &str = "SELECT h.id, h.project_id, p.name, h.site_id, h.urls_discovered,
        h.urls_crawled, h.urls_successful, h.urls_failed, h.urls_skipped, h.status,
        h.error_details, h.started_at, h.completed_at
 FROM crawl_history h
 LEFT JOIN projects p ON p.id = h.project_id";

/// Appends the conjunctive filter clauses shared by search queries
fn append_filters(sql: &mut String, values: &mut Vec<Box<dyn ToSql>>, filters: &SearchFilters) {
    if let Some(project_id) = filters.project_id {
        sql.push_str(" AND d.project_id = ?");
        values.push(Box::new(project_id));
    }
    if let Some(content_type) = &filters.content_type {
        sql.push_str(" AND d.content_type = ?");
        values.push(Box::new(content_type.clone()));
    }
    if let Some(site_id) = filters.site_id {
        sql.push_str(" AND d.site_id = ?");
        values.push(Box::new(site_id));
    }
    if let Some(language) = &filters.language {
        sql.push_str(" AND d.language = ?");
        values.push(Box::new(language.clone()));
    }
    if let Some(from) = &filters.date_from {
        sql.push_str(" AND date(d.indexed_at) >= date(?)");
        values.push(Box::new(from.clone()));
    }
    if let Some(to) = &filters.date_to {
        sql.push_str(" AND date(d.indexed_at) <= date(?)");
        values.push(Box::new(to.clone()));
    }
}

impl Store for SqliteStorage {
    // ===== Projects & Sites =====

    fn create_project(
        &mut self,
        name: &str,
        base_domains: &[String],
        settings: &CrawlSettings,
    ) -> StorageResult<i64> {
        let domains_json = serde_json::to_string(base_domains)?;
        let settings_json = serde_json::to_string(&CrawlSettingsJson::from(settings))?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO projects (name, base_domains, crawl_settings, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, domains_json, settings_json, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_project(&self, project_id: i64) -> StorageResult<Option<ProjectRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, base_domains, crawl_settings, created_at FROM projects WHERE id = ?1",
        )?;
        let project = stmt
            .query_row(params![project_id], |row| project_from_row(row))
            .optional()?;
        Ok(project)
    }

    fn get_project_by_name(&self, name: &str) -> StorageResult<Option<ProjectRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, base_domains, crawl_settings, created_at FROM projects WHERE name = ?1",
        )?;
        let project = stmt
            .query_row(params![name], |row| project_from_row(row))
            .optional()?;
        Ok(project)
    }

    fn create_site(
        &mut self,
        project_id: i64,
        domain: &str,
        base_url: &str,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO sites (project_id, domain, base_url, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                project_id,
                domain,
                base_url,
                SiteStatus::Pending.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_site(&self, site_id: i64) -> StorageResult<Option<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1", SITE_SELECT))?;
        let site = stmt
            .query_row(params![site_id], |row| site_from_row(row))
            .optional()?;
        Ok(site)
    }

    fn find_site_by_url(&self, base_url: &str) -> StorageResult<Option<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE base_url = ?1", SITE_SELECT))?;
        let site = stmt
            .query_row(params![base_url], |row| site_from_row(row))
            .optional()?;
        Ok(site)
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} ORDER BY last_crawled DESC, id ASC",
            SITE_SELECT
        ))?;
        let sites = stmt
            .query_map([], |row| site_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn claim_site(&mut self, site_id: i64) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "UPDATE sites SET status = ?1 WHERE id = ?2 AND status NOT IN (?3, ?4)",
            params![
                SiteStatus::Processing.to_db_string(),
                site_id,
                SiteStatus::Processing.to_db_string(),
                SiteStatus::Blocked.to_db_string()
            ],
        )?;
        Ok(changed == 1)
    }

    fn finish_site(&mut self, site_id: i64, status: SiteStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE sites SET status = ?1, last_crawled = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, site_id],
        )?;
        Ok(())
    }

    // ===== Crawl Queue =====

    fn enqueue(&mut self, entry: &NewQueueEntry) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO crawl_queue
             (project_id, site_id, url, url_hash, depth, parent_url, priority, status, scheduled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.project_id,
                entry.site_id,
                entry.url,
                entry.url_hash,
                entry.depth,
                entry.parent_url,
                entry.priority,
                QueueState::Pending.to_db_string(),
                now
            ],
        )?;
        Ok(inserted == 1)
    }

    fn reset_site_queue(&mut self, site_id: i64) -> StorageResult<u64> {
        let changed = self.conn.execute(
            "UPDATE crawl_queue SET status = ?1, last_error = NULL, processed_at = NULL
             WHERE site_id = ?2 AND status != ?1",
            params![QueueState::Pending.to_db_string(), site_id],
        )?;
        Ok(changed as u64)
    }

    fn claim_next_pending(&mut self, site_id: i64) -> StorageResult<Option<QueueEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE site_id = ?1 AND status = ?2 ORDER BY priority DESC, id ASC LIMIT 1",
            QUEUE_SELECT
        ))?;
        let entry = stmt
            .query_row(
                params![site_id, QueueState::Pending.to_db_string()],
                |row| queue_entry_from_row(row),
            )
            .optional()?;
        drop(stmt);

        if let Some(mut entry) = entry {
            self.conn.execute(
                "UPDATE crawl_queue SET status = ?1 WHERE id = ?2",
                params![QueueState::Processing.to_db_string(), entry.id],
            )?;
            entry.status = QueueState::Processing;
            Ok(Some(entry))
        } else {
            Ok(None)
        }
    }

    fn mark_queue_entry(
        &mut self,
        entry_id: i64,
        status: QueueState,
        error: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_queue SET status = ?1, last_error = ?2, processed_at = ?3 WHERE id = ?4",
            params![status.to_db_string(), error, now, entry_id],
        )?;
        Ok(())
    }

    fn count_queue_entries(&self, site_id: i64, status: QueueState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_queue WHERE site_id = ?1 AND status = ?2",
            params![site_id, status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn queue_snapshot(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<QueueSnapshotRow>> {
        let mut sql = String::from(
            "SELECT q.url, p.name, q.status, q.priority, q.depth, q.scheduled_at
             FROM crawl_queue q
             LEFT JOIN projects p ON p.id = q.project_id",
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project_id) = project_id {
            sql.push_str(" WHERE q.project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" ORDER BY q.priority DESC, q.scheduled_at ASC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok(QueueSnapshotRow {
                    url: row.get(0)?,
                    project_name: row.get(1)?,
                    status: QueueState::from_db_string(&row.get::<_, String>(2)?)
                        .unwrap_or(QueueState::Failed),
                    priority: row.get(3)?,
                    depth: row.get(4)?,
                    scheduled_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ===== Documents =====

    fn document_exists(&self, url_hash: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE url_hash = ?1 LIMIT 1",
                params![url_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_document(&mut self, doc: &NewDocument) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents
             (project_id, site_id, url, url_hash, content_type, title, description, content,
              language, file_size, quality_score, metadata, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                doc.project_id,
                doc.site_id,
                doc.url,
                doc.url_hash,
                doc.content_type,
                doc.title,
                doc.description,
                doc.content,
                doc.language,
                doc.file_size,
                doc.quality_score,
                doc.metadata,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_documents_for_site(&self, site_id: i64) -> StorageResult<Vec<DocumentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE site_id = ?1 ORDER BY id ASC", DOCUMENT_SELECT))?;
        let docs = stmt
            .query_map(params![site_id], |row| document_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn list_documents_for_project(&self, project_id: i64) -> StorageResult<Vec<DocumentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE project_id = ?1 ORDER BY id ASC",
            DOCUMENT_SELECT
        ))?;
        let docs = stmt
            .query_map(params![project_id], |row| document_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn count_documents_for_site(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Term Index =====

    fn replace_document_terms(
        &mut self,
        document_id: i64,
        project_id: i64,
        postings: &[TermPosting],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM search_terms WHERE document_id = ?1",
            params![document_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO search_terms
                 (project_id, document_id, term, term_hash, frequency, weight, field, context)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for posting in postings {
                stmt.execute(params![
                    project_id,
                    document_id,
                    posting.term,
                    posting.term_hash,
                    posting.frequency,
                    posting.weight,
                    posting.field,
                    posting.context
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn count_document_terms(&self, document_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM search_terms WHERE document_id = ?1",
            params![document_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn delete_orphan_postings(&mut self) -> StorageResult<u64> {
        let deleted = self.conn.execute(
            "DELETE FROM search_terms WHERE document_id NOT IN (SELECT id FROM documents)",
            [],
        )?;
        Ok(deleted as u64)
    }

    fn analyze(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("ANALYZE;")?;
        Ok(())
    }

    fn index_statistics(&self) -> StorageResult<IndexStatistics> {
        let total_documents: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        let total_postings: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM search_terms", [], |row| row.get(0))?;
        let distinct_terms: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT term) FROM search_terms",
            [],
            |row| row.get(0),
        )?;
        let total_occurrences: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(frequency), 0) FROM search_terms",
            [],
            |row| row.get(0),
        )?;

        Ok(IndexStatistics {
            total_documents: total_documents as u64,
            total_postings: total_postings as u64,
            distinct_terms: distinct_terms as u64,
            total_occurrences: total_occurrences as u64,
        })
    }

    // ===== Search =====

    fn search_candidates(
        &self,
        patterns: &[String],
        filters: &SearchFilters,
    ) -> StorageResult<Vec<SearchCandidate>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!("{} WHERE (", CANDIDATE_SELECT);
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        for (i, pattern) in patterns.iter().enumerate() {
            if i > 0 {
                sql.push_str(" OR ");
            }
            sql.push_str("(d.title LIKE ? OR d.description LIKE ? OR d.content LIKE ?)");
            for _ in 0..3 {
                values.push(Box::new(pattern.clone()));
            }
        }
        sql.push(')');

        append_filters(&mut sql, &mut values, filters);

        let mut stmt = self.conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                candidate_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    fn fallback_candidates(
        &self,
        pattern: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> StorageResult<Vec<SearchCandidate>> {
        let mut sql = format!(
            "{} WHERE (d.title LIKE ? OR d.description LIKE ? OR d.content LIKE ?)",
            CANDIDATE_SELECT
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        for _ in 0..3 {
            values.push(Box::new(pattern.to_string()));
        }

        append_filters(&mut sql, &mut values, filters);

        sql.push_str(" ORDER BY d.indexed_at DESC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                candidate_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    fn facet_content_types(&self, project_id: Option<i64>) -> StorageResult<Vec<(String, u64)>> {
        let mut sql = String::from("SELECT content_type, COUNT(*) FROM documents");
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project_id) = project_id {
            sql.push_str(" WHERE project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" GROUP BY content_type ORDER BY COUNT(*) DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn facet_projects(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, COUNT(*) FROM documents d
             JOIN projects p ON p.id = d.project_id
             GROUP BY p.id, p.name ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn facet_sites(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<(String, u64)>> {
        let mut sql = String::from(
            "SELECT s.domain, COUNT(*) FROM documents d JOIN sites s ON s.id = d.site_id",
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project_id) = project_id {
            sql.push_str(" WHERE d.project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" GROUP BY s.domain ORDER BY COUNT(*) DESC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn suggest_terms(
        &self,
        pattern: &str,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<String>> {
        let mut sql = String::from("SELECT term FROM search_terms WHERE term LIKE ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(pattern.to_string())];

        if let Some(project_id) = project_id {
            sql.push_str(" AND project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" GROUP BY term ORDER BY SUM(frequency) DESC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let terms = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(terms)
    }

    fn suggest_titles(
        &self,
        pattern: &str,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<String>> {
        let mut sql =
            String::from("SELECT title FROM documents WHERE title IS NOT NULL AND title LIKE ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(pattern.to_string())];

        if let Some(project_id) = project_id {
            sql.push_str(" AND project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" ORDER BY pagerank_score DESC, indexed_at DESC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let titles = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    // ===== Crawl History =====

    fn start_history(&mut self, project_id: i64, site_id: i64) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_history (project_id, site_id, status, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                project_id,
                site_id,
                RunStatus::Running.to_db_string(),
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finalize_history(
        &mut self,
        history_id: i64,
        counters: &RunCounters,
        status: RunStatus,
        error_details: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_history
             SET urls_discovered = ?1, urls_crawled = ?2, urls_successful = ?3,
                 urls_failed = ?4, urls_skipped = ?5, status = ?6, error_details = ?7,
                 completed_at = ?8
             WHERE id = ?9",
            params![
                counters.urls_discovered as i64,
                counters.urls_crawled as i64,
                counters.urls_successful as i64,
                counters.urls_failed as i64,
                counters.urls_skipped as i64,
                status.to_db_string(),
                error_details,
                now,
                history_id
            ],
        )?;
        Ok(())
    }

    fn list_history(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> StorageResult<Vec<CrawlHistoryRecord>> {
        let mut sql = String::from(HISTORY_SELECT);
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project_id) = project_id {
            sql.push_str(" WHERE h.project_id = ?");
            values.push(Box::new(project_id));
        }
        sql.push_str(" ORDER BY h.started_at DESC, h.id DESC LIMIT ?");
        values.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                history_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
