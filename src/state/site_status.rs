use serde::Serialize;
use std::fmt;

/// Represents the lifecycle status of a registered site
///
/// `Processing` doubles as an advisory lock: a crawl run claims a site by
/// flipping it to `Processing` and no second run may start until it leaves
/// that status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Site is registered but has never been crawled
    Pending,

    /// Site has at least one successful crawl behind it
    Active,

    /// A crawl run is currently underway for this site
    Processing,

    /// The most recent crawl run ended with a run-level failure
    Error,

    /// Site has been administratively excluded from crawling
    Blocked,
}

impl SiteStatus {
    /// Converts the site status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Processing => "processing",
            Self::Error => "error",
            Self::Blocked => "blocked",
        }
    }

    /// Parses a site status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "processing" => Some(Self::Processing),
            "error" => Some(Self::Error),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Returns true if a new crawl run may be started for this status
    pub fn is_crawlable(&self) -> bool {
        !matches!(self, Self::Processing | Self::Blocked)
    }

    /// Returns all possible site statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Active,
            Self::Processing,
            Self::Error,
            Self::Blocked,
        ]
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
