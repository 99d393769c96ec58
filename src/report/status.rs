//! Site and index status reporting
//!
//! Composes a status snapshot from the storage layer: per-site document and
//! queue counts plus the aggregate index statistics.

use serde::Serialize;

use crate::state::{QueueState, SiteStatus};
use crate::storage::{IndexStatistics, StorageError, StorageResult, Store};

/// Queue and document counts for one registered site
#[derive(Debug, Clone, Serialize)]
pub struct SiteStatusRow {
    pub site_id: i64,
    pub project_id: i64,
    pub domain: String,
    pub base_url: String,
    pub status: SiteStatus,
    pub documents: u64,
    pub pending: u64,
    pub processing: u64,
    pub last_crawled: Option<String>,
}

/// Full status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub sites: Vec<SiteStatusRow>,
    pub index: IndexStatistics,
}

/// Loads the status snapshot from storage
///
/// # Arguments
///
/// * `store` - Storage backend to query
/// * `site_id` - Restrict the report to one site, or None for all sites
///
/// # Returns
///
/// * `Ok(StatusReport)` - Per-site rows plus index statistics
/// * `Err(StorageError::SiteNotFound)` - The requested site does not exist
pub fn load_status<S: Store>(store: &S, site_id: Option<i64>) -> StorageResult<StatusReport> {
    let sites = match site_id {
        Some(id) => {
            let site = store.get_site(id)?.ok_or(StorageError::SiteNotFound(id))?;
            vec![site]
        }
        None => store.list_sites()?,
    };

    let mut rows = Vec::with_capacity(sites.len());
    for site in sites {
        rows.push(SiteStatusRow {
            documents: store.count_documents_for_site(site.id)?,
            pending: store.count_queue_entries(site.id, QueueState::Pending)?,
            processing: store.count_queue_entries(site.id, QueueState::Processing)?,
            site_id: site.id,
            project_id: site.project_id,
            domain: site.domain,
            base_url: site.base_url,
            status: site.status,
            last_crawled: site.last_crawled,
        });
    }

    Ok(StatusReport {
        sites: rows,
        index: store.index_statistics()?,
    })
}

/// Prints the status snapshot to stdout
pub fn print_status(report: &StatusReport) {
    println!("=== Site Status ===\n");

    if report.sites.is_empty() {
        println!("No sites registered.\n");
    }
    for site in &report.sites {
        println!("[{}] {} ({})", site.site_id, site.domain, site.status);
        println!("  Base URL:     {}", site.base_url);
        println!("  Project:      {}", site.project_id);
        println!("  Documents:    {}", site.documents);
        println!(
            "  Queue:        {} pending, {} processing",
            site.pending, site.processing
        );
        println!(
            "  Last crawled: {}",
            site.last_crawled.as_deref().unwrap_or("never")
        );
        println!();
    }

    println!("=== Index Statistics ===\n");
    println!("  Documents:        {}", report.index.total_documents);
    println!("  Postings:         {}", report.index.total_postings);
    println!("  Distinct terms:   {}", report.index.distinct_terms);
    println!("  Term occurrences: {}", report.index.total_occurrences);
}
