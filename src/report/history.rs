//! Crawl history and queue printers

use crate::storage::{CrawlHistoryRecord, QueueSnapshotRow};

/// How many history rows the CLI shows
pub const HISTORY_LIMIT: u32 = 50;
/// How many queue rows the CLI shows
pub const QUEUE_LIMIT: u32 = 100;

/// Prints crawl run records to stdout, newest first
pub fn print_history(records: &[CrawlHistoryRecord]) {
    println!("=== Crawl History ===\n");

    if records.is_empty() {
        println!("No crawl runs recorded.");
        return;
    }
    for record in records {
        let project = record.project_name.as_deref().unwrap_or("?");
        println!(
            "[{}] {} / site {} ({})",
            record.id,
            project,
            record.site_id,
            record.status.to_db_string()
        );
        println!("  Started:   {}", record.started_at);
        println!(
            "  Completed: {}",
            record.completed_at.as_deref().unwrap_or("-")
        );
        println!(
            "  URLs: {} crawled, {} ok, {} failed, {} skipped, {} discovered",
            record.urls_crawled,
            record.urls_successful,
            record.urls_failed,
            record.urls_skipped,
            record.urls_discovered
        );
        if let Some(error) = &record.error_details {
            println!("  Error: {}", error);
        }
        println!();
    }
}

/// Prints a queue snapshot to stdout, highest priority first
pub fn print_queue(rows: &[QueueSnapshotRow]) {
    println!("=== Crawl Queue ===\n");

    if rows.is_empty() {
        println!("Queue is empty.");
        return;
    }
    println!(
        "{:<12} {:>8} {:>5}  {}",
        "STATUS", "PRIORITY", "DEPTH", "URL"
    );
    for row in rows {
        println!(
            "{:<12} {:>8} {:>5}  {}",
            row.status.to_db_string(),
            row.priority,
            row.depth,
            row.url
        );
    }
    println!("\n{} entries shown", rows.len());
}
