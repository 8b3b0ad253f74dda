//! Wheel input gating with burst acceleration
//!
//! A burst is a run of accepted ticks separated by less than the burst gap.
//! The longer a burst lasts, the faster pages may turn, following a step
//! curve of [`SpeedTier`]s. Ticks arriving faster than the current speed
//! allows are dropped without side effect.

use crate::config::{ScrollConfig, ScrollPolarity, SpeedTier};
use std::time::{Duration, Instant};

/// A single-page navigation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStep {
    Previous,
    Next,
}

impl NavigationStep {
    pub fn delta(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

impl ScrollPolarity {
    /// Step for a wheel movement; positive deltas are "up"
    pub fn step(self, wheel_delta: i32) -> NavigationStep {
        let up = wheel_delta > 0;
        match (self, up) {
            (Self::UpIsPrevious, true) | (Self::UpIsNext, false) => NavigationStep::Previous,
            (Self::UpIsPrevious, false) | (Self::UpIsNext, true) => NavigationStep::Next,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollRateLimiter {
    burst_gap: Duration,
    tiers: Vec<SpeedTier>,
    polarity: ScrollPolarity,
    last_accepted: Option<Instant>,
    burst_start: Option<Instant>,
}

impl ScrollRateLimiter {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            burst_gap: config.burst_gap(),
            tiers: config.tiers.clone(),
            polarity: config.polarity,
            last_accepted: None,
            burst_start: None,
        }
    }

    /// Feed one wheel tick observed at `now`
    ///
    /// # Returns
    ///
    /// The navigation step to perform, or `None` if the tick was rejected.
    pub fn on_tick(&mut self, now: Instant, wheel_delta: i32) -> Option<NavigationStep> {
        let since_last = self.last_accepted.map(|last| now.saturating_duration_since(last));

        if since_last.is_none_or(|gap| gap > self.burst_gap) {
            self.burst_start = Some(now);
        }

        let burst_start = *self.burst_start.get_or_insert(now);
        let burst = now.saturating_duration_since(burst_start);
        let min_interval = self.min_interval(burst);

        if since_last.is_some_and(|gap| gap < min_interval) {
            tracing::trace!(?burst, ?min_interval, "scroll tick rejected");
            return None;
        }

        self.last_accepted = Some(now);
        Some(self.polarity.step(wheel_delta))
    }

    /// Pages per second allowed after a burst of length `burst`
    pub fn speed(&self, burst: Duration) -> f64 {
        let millis = burst.as_millis();
        self.tiers
            .iter()
            .find(|tier| tier.below_ms.is_none_or(|limit| millis < u128::from(limit)))
            .or(self.tiers.last())
            .map_or(1.0, |tier| tier.pages_per_second)
    }

    /// Minimum spacing between accepted ticks after a burst of length `burst`
    pub fn min_interval(&self, burst: Duration) -> Duration {
        let nanos = (1e9 / self.speed(burst)).round();
        Duration::from_nanos(nanos as u64)
    }

    pub fn polarity(&self) -> ScrollPolarity {
        self.polarity
    }

    /// Forget the current burst
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.burst_start = None;
    }
}
