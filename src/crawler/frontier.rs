//! Crawl frontier
//!
//! Stamps new URLs into the persistent queue with their depth and priority.
//! The seed enters at the base priority; links discovered during a run are
//! queued above it, so freshly found pages drain before older re-queued
//! entries. Queue identity is (project, url_hash), making both operations
//! idempotent.

use crate::storage::{NewQueueEntry, StorageResult, Store};
use crate::url::url_hash;
use url::Url;

/// Priority assigned to the seed entry of a crawl run
pub const SEED_PRIORITY: u32 = 1;

/// Priority assigned to links discovered while crawling
pub const LINK_PRIORITY: u32 = 5;

/// Enqueues a site's seed URL at depth 0
///
/// # Returns
///
/// * `Ok(true)` - The seed was newly enqueued
/// * `Ok(false)` - The URL was already in the queue
pub fn seed<S: Store>(
    store: &mut S,
    project_id: i64,
    site_id: i64,
    url: &Url,
) -> StorageResult<bool> {
    let entry = NewQueueEntry {
        project_id,
        site_id,
        url: url.to_string(),
        url_hash: url_hash(url.as_str()),
        depth: 0,
        parent_url: None,
        priority: SEED_PRIORITY,
    };

    store.enqueue(&entry)
}

/// Enqueues a link discovered on a crawled page
///
/// The entry lands one level deeper than its parent and records the parent
/// URL for traceability.
///
/// # Returns
///
/// * `Ok(true)` - The link was newly enqueued
/// * `Ok(false)` - The URL was already in the queue
pub fn enqueue_discovered<S: Store>(
    store: &mut S,
    project_id: i64,
    site_id: i64,
    link: &Url,
    parent_depth: u32,
    parent_url: &str,
) -> StorageResult<bool> {
    let entry = NewQueueEntry {
        project_id,
        site_id,
        url: link.to_string(),
        url_hash: url_hash(link.as_str()),
        depth: parent_depth + 1,
        parent_url: Some(parent_url.to_string()),
        priority: LINK_PRIORITY,
    };

    store.enqueue(&entry)
}
