//! State module for tracking crawl progress
//!
//! This module provides the shared state primitives used by a crawl run.
//!
//! # Components
//!
//! - `QueueState`: Tracks the state of individual queue entries (pending, processing, completed, failed, skipped)
//! - `SiteStatus`: Lifecycle status of a registered site; `processing` doubles as an advisory lock
//! - `Pacer`: Enforces the minimum delay between consecutive requests
//! - `CancelToken`: Cooperative cancellation polled at URL boundaries

mod cancel;
mod pacer;
mod queue_state;
mod site_status;

// Re-export main types
pub use cancel::CancelToken;
pub use pacer::Pacer;
pub use queue_state::QueueState;
pub use site_status::SiteStatus;
