//! Per-target circuit breaker.
//!
//! Two logical states, derived rather than stored:
//!
//! ```text
//! Closed: open_until unset or in the past
//! Open:   now < open_until
//! ```
//!
//! The k-th consecutive failure opens the breaker for `open_duration` and
//! resets the failure count. Once the deadline passes the target is tried
//! again with no explicit transition.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker. Must be at least 1.
    pub max_failures: u32,
    pub open_duration: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            open_duration: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Whether the target may be tried right now.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    pub fn allow_at(&self, now: Instant) -> bool {
        self.state().open_until.is_none_or(|until| now >= until)
    }

    pub fn mark_success(&self) {
        let mut state = self.state();
        state.consecutive_failures = 0;
        state.open_until = None;
    }

    /// Records a failed attempt. Returns `true` when this failure opened the breaker.
    pub fn mark_failure(&self) -> bool {
        self.mark_failure_at(Instant::now())
    }

    pub fn mark_failure_at(&self, now: Instant) -> bool {
        let mut state = self.state();
        state.consecutive_failures += 1;
        if state.consecutive_failures < self.config.max_failures.max(1) {
            return false;
        }

        state.consecutive_failures = 0;
        // A zero-length window would never be in the future.
        if self.config.open_duration.is_zero() {
            return false;
        }
        state.open_until = Some(now + self.config.open_duration);
        true
    }

    /// Time left until the breaker closes on its own; zero when closed.
    pub fn remaining_open(&self) -> Duration {
        self.remaining_open_at(Instant::now())
    }

    pub fn remaining_open_at(&self, now: Instant) -> Duration {
        self.state()
            .open_until
            .map_or(Duration::ZERO, |until| until.saturating_duration_since(now))
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state().consecutive_failures
    }

    fn state(&self) -> MutexGuard<'_, BreakerState> {
        // No critical section can leave partial state behind.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
