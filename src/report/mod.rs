//! Operator-facing reports
//!
//! This module builds and prints the CLI's read-only views:
//! - Site status with document and queue counts, plus index statistics
//! - Crawl run history and queue snapshots
//! - Search result formatting for the terminal

mod history;
mod search;
mod status;

pub use history::{print_history, print_queue, HISTORY_LIMIT, QUEUE_LIMIT};
pub use search::print_search;
pub use status::{load_status, print_status, SiteStatusRow, StatusReport};
