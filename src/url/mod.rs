//! URL handling module for Loupe
//!
//! This module provides URL normalization, link resolution, the crawl scope
//! policy, and the hash identity used for queue and document deduplication.

mod normalize;
mod policy;

use sha2::{Digest, Sha256};

// Re-export main functions
pub use normalize::{normalize_url, resolve_href};
pub use policy::{has_skipped_extension, in_scope, MAX_URL_LENGTH, SKIP_EXTENSIONS};

/// Computes the deduplication hash of a normalized URL
///
/// SHA-256 over the serialized URL, hex-encoded. Used as the uniqueness key
/// for both queue entries and stored documents.
///
/// # Examples
///
/// ```
/// use loupe::url::url_hash;
///
/// let hash = url_hash("https://example.com/page");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
