//! Monotonic time source for input gating

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a test (or a replayed input script) can
/// hold one handle while the reader owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_micros: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self { origin: Instant::now(), offset_micros: Arc::new(AtomicU64::new(0)) }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn advance(&self, by: Duration) {
        self.offset_micros.fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    /// Jump to `offset` past the origin
    pub fn set(&self, offset: Duration) {
        self.offset_micros.store(offset.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.offset_micros.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
