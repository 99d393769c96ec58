use std::time::{Duration, Instant};

/// Enforces the minimum delay between consecutive requests to a site
///
/// A crawl run fetches one URL at a time, so a single pacer per run is
/// enough. The delay starts at the configured per-site value; a robots.txt
/// Crawl-delay directive may lengthen it but never shorten it.
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Minimum time between requests
    delay: Duration,

    /// Timestamp of the last request, if any
    last_request: Option<Instant>,
}

impl Pacer {
    /// Creates a new pacer with the given minimum delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Returns the current minimum delay between requests
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Raises the minimum delay to `delay` if it is longer than the current one
    ///
    /// Used when robots.txt advertises a Crawl-delay. The configured delay is
    /// a floor, so a shorter directive is ignored.
    pub fn extend_delay(&mut self, delay: Duration) {
        if delay > self.delay {
            self.delay = delay;
        }
    }

    /// Records that a request was made at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.last_request = Some(now);
    }

    /// Calculates the time to wait before the next request
    ///
    /// Returns None if a request can be made immediately.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if let Some(last) = self.last_request {
            let elapsed = now.duration_since(last);
            if elapsed < self.delay {
                return Some(self.delay - elapsed);
            }
        }
        None
    }
}
