//! Cooperative cancellation
//!
//! A token is shared between whoever schedules deferred work and whoever
//! runs it. Cancelling any clone is observed by all clones.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token for deferred tasks
///
/// # Example
///
/// ```
/// use comic_reader_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let task_token = token.clone();
///
/// token.cancel();
/// assert!(task_token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
