//! Crawler module for site fetching and indexing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with size caps and error classification
//! - Content parsing for HTML, plain text and media resources
//! - Frontier priorities for seeds and discovered links
//! - Overall crawl orchestration with per-run history
//!
//! A crawl run drains one site's persistent queue URL by URL, honoring the
//! project's depth limit, the page budget, and the configured request delay.

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlPhase, CrawlReport, Crawler};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome, MAX_REDIRECTS};
pub use frontier::{enqueue_discovered, seed, LINK_PRIORITY, SEED_PRIORITY};
pub use parser::{clean_text, parse_content, parse_html, ContentKind, ParsedDocument, MAX_CONTENT_CHARS};
