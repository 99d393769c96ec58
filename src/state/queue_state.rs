//! Queue entry state definitions for tracking crawl progress
//!
//! This module defines all possible states a queue entry can be in during a crawl run.

use serde::Serialize;
use std::fmt;

/// Represents the current state of a URL in the crawl queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    // ===== Active States =====
    /// Entry is waiting to be claimed by the orchestrator
    Pending,

    /// Entry has been claimed and its URL is being fetched
    Processing,

    // ===== Terminal States =====
    /// URL was fetched, parsed and stored successfully
    Completed,

    /// Fetch or parse failed; last_error carries the reason
    Failed,

    /// URL was already indexed for this project, so it was not refetched
    Skipped,
}

impl QueueState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Processing)
    }

    /// Converts the queue state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a queue state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Returns all possible queue states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Failed,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
