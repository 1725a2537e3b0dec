use std::time::Duration;

/// Decides what happens after a routing round in which no target accepted
/// the payment.
pub trait RetryPolicy: Send + Sync {
    /// `rounds` is the number of failed rounds so far (starting at 1).
    /// `breaker_hint` is the shortest remaining open window among open
    /// breakers, if any is open.
    ///
    /// Returns the delay before the next round, or `None` to abandon the payment.
    fn next_delay(&self, rounds: u32, breaker_hint: Option<Duration>) -> Option<Duration>;
}

pub type RetryPolicyBox = Box<dyn RetryPolicy>;

pub const DEFAULT_RETRY_FLOOR: Duration = Duration::from_millis(10);

fn backoff(floor: Duration, breaker_hint: Option<Duration>) -> Duration {
    breaker_hint.filter(|d| !d.is_zero()).unwrap_or(floor)
}

/// Never gives up. Sleeps until the first open breaker is due to close, or
/// for `floor` when no breaker is open.
///
/// Under a total outage the payment occupies its worker indefinitely.
#[derive(Debug, Clone, Copy)]
pub struct RetryForever {
    pub floor: Duration,
}

impl Default for RetryForever {
    fn default() -> Self {
        Self {
            floor: DEFAULT_RETRY_FLOOR,
        }
    }
}

impl RetryPolicy for RetryForever {
    fn next_delay(&self, _rounds: u32, breaker_hint: Option<Duration>) -> Option<Duration> {
        Some(backoff(self.floor, breaker_hint))
    }
}

/// Same backoff as [`RetryForever`] but abandons the payment after `max_rounds`.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRetry {
    pub max_rounds: u32,
    pub floor: Duration,
}

impl RetryPolicy for BoundedRetry {
    fn next_delay(&self, rounds: u32, breaker_hint: Option<Duration>) -> Option<Duration> {
        (rounds < self.max_rounds).then(|| backoff(self.floor, breaker_hint))
    }
}
