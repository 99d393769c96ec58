//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the Loupe database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Search projects: group sites and scope the index
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    base_domains TEXT NOT NULL DEFAULT '[]',
    crawl_settings TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);

-- Registered sites owned by a project
CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    domain TEXT NOT NULL,
    base_url TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    last_crawled TEXT,
    crawl_frequency TEXT NOT NULL DEFAULT 'weekly',
    UNIQUE(project_id, base_url)
);

CREATE INDEX IF NOT EXISTS idx_sites_project ON sites(project_id);
CREATE INDEX IF NOT EXISTS idx_sites_status ON sites(status);

-- Indexed documents (webpages and media)
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    site_id INTEGER NOT NULL REFERENCES sites(id),
    url TEXT NOT NULL,
    url_hash TEXT NOT NULL UNIQUE,
    content_type TEXT NOT NULL DEFAULT 'webpage',
    title TEXT,
    description TEXT,
    content TEXT,
    language TEXT NOT NULL DEFAULT 'fr',
    file_size INTEGER,
    pagerank_score REAL NOT NULL DEFAULT 1.0,
    quality_score REAL NOT NULL DEFAULT 0.0,
    metadata TEXT,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id);
CREATE INDEX IF NOT EXISTS idx_documents_site ON documents(site_id);
CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(content_type);

-- Crawl queue; one entry per (project, url identity)
CREATE TABLE IF NOT EXISTS crawl_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    site_id INTEGER NOT NULL REFERENCES sites(id),
    url TEXT NOT NULL,
    url_hash TEXT NOT NULL,
    depth INTEGER NOT NULL DEFAULT 0,
    parent_url TEXT,
    priority INTEGER NOT NULL DEFAULT 5,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT,
    scheduled_at TEXT NOT NULL,
    processed_at TEXT,
    UNIQUE(project_id, url_hash)
);

CREATE INDEX IF NOT EXISTS idx_queue_claim ON crawl_queue(site_id, status, priority);

-- Inverted index postings
CREATE TABLE IF NOT EXISTS search_terms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    document_id INTEGER NOT NULL REFERENCES documents(id),
    term TEXT NOT NULL,
    term_hash TEXT NOT NULL,
    frequency INTEGER NOT NULL DEFAULT 1,
    weight REAL NOT NULL DEFAULT 1.0,
    field TEXT NOT NULL DEFAULT 'content',
    context TEXT
);

CREATE INDEX IF NOT EXISTS idx_terms_term ON search_terms(term);
CREATE INDEX IF NOT EXISTS idx_terms_document ON search_terms(document_id);
CREATE INDEX IF NOT EXISTS idx_terms_project_term ON search_terms(project_id, term);

-- One row per crawl run, finalized success or failure
CREATE TABLE IF NOT EXISTS crawl_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    site_id INTEGER NOT NULL REFERENCES sites(id),
    urls_discovered INTEGER NOT NULL DEFAULT 0,
    urls_crawled INTEGER NOT NULL DEFAULT 0,
    urls_successful INTEGER NOT NULL DEFAULT 0,
    urls_failed INTEGER NOT NULL DEFAULT 0,
    urls_skipped INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'running',
    error_details TEXT,
    started_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_history_project ON crawl_history(project_id);
CREATE INDEX IF NOT EXISTS idx_history_site ON crawl_history(site_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Gets the current schema version
///
/// This can be used for future migrations if the schema changes.
pub fn get_schema_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Initialize twice
        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        // Should succeed the second time too
        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = vec![
            "projects",
            "sites",
            "documents",
            "crawl_queue",
            "search_terms",
            "crawl_history",
        ];

        for table in tables {
            let count: Result<i64, _> = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ),
                [],
                |row| row.get(0),
            );
            assert!(count.is_ok());
            assert_eq!(count.unwrap(), 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_queue_uniqueness_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO projects (name, created_at) VALUES ('p', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO sites (project_id, domain, base_url) VALUES (1, 'example.com', 'https://example.com/')",
            [],
        )
        .unwrap();

        let insert = "INSERT OR IGNORE INTO crawl_queue
             (project_id, site_id, url, url_hash, scheduled_at)
             VALUES (1, 1, 'https://example.com/', 'abc', '2024-01-01T00:00:00Z')";
        let first = conn.execute(insert, []).unwrap();
        let second = conn.execute(insert, []).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }
}
