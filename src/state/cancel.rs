use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for a crawl run
///
/// Cloned handles share the same flag. The orchestrator polls the token once
/// per loop iteration, so cancellation takes effect at the next URL boundary
/// rather than mid-fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation on all clones of this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
