use super::retry::RetryPolicyBox;
use crate::domain::breaker::{BreakerConfig, CircuitBreaker};
use crate::domain::payment::{PaymentEnvelope, PaymentRecord, PaymentRequest, Target};
use crate::domain::ports::PaymentProcessorBox;
use crate::error::{Result, RouterError};
use chrono::Utc;
use std::time::Duration;
use tracing::debug;

struct Route {
    processor: PaymentProcessorBox,
    breaker: CircuitBreaker,
}

/// Turns one payment request into exactly one ledger record.
///
/// Every round tries Default then Fallback, skipping any target whose breaker
/// is open. When a round ends without a success the [`RetryPolicy`] decides
/// how long to back off, using the shortest remaining open window as a hint.
///
/// [`RetryPolicy`]: super::retry::RetryPolicy
pub struct PaymentRouter {
    default: Route,
    fallback: Route,
    retry: RetryPolicyBox,
}

impl PaymentRouter {
    pub fn new(
        default: PaymentProcessorBox,
        fallback: PaymentProcessorBox,
        breakers: BreakerConfig,
        retry: RetryPolicyBox,
    ) -> Self {
        Self {
            default: Route {
                processor: default,
                breaker: CircuitBreaker::new(breakers),
            },
            fallback: Route {
                processor: fallback,
                breaker: CircuitBreaker::new(breakers),
            },
            retry,
        }
    }

    pub fn breaker(&self, target: Target) -> &CircuitBreaker {
        &self.route(target).breaker
    }

    fn route(&self, target: Target) -> &Route {
        match target {
            Target::Default => &self.default,
            Target::Fallback => &self.fallback,
        }
    }

    /// Routes the payment until a processor accepts it.
    ///
    /// Only returns an error if the retry policy abandons the payment.
    pub async fn process(&self, request: &PaymentRequest) -> Result<PaymentRecord> {
        let mut rounds = 0;
        loop {
            for target in Target::PREFERENCE {
                if let Some(record) = self.attempt(target, request).await {
                    return Ok(record);
                }
            }

            rounds += 1;
            match self.retry.next_delay(rounds, self.breaker_hint()) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(RouterError::RetriesExhausted { rounds }),
            }
        }
    }

    async fn attempt(&self, target: Target, request: &PaymentRequest) -> Option<PaymentRecord> {
        let route = self.route(target);
        if !route.breaker.allow() {
            return None;
        }

        let envelope = PaymentEnvelope::stamp(request, Utc::now());
        match route.processor.deliver(&envelope).await {
            Ok(()) => {
                route.breaker.mark_success();
                Some(envelope.into_record(target))
            }
            Err(e) => {
                debug!(%target, correlation_id = %request.correlation_id, error = %e, "delivery failed");
                if route.breaker.mark_failure() {
                    debug!(%target, "circuit opened");
                }
                None
            }
        }
    }

    /// Shortest remaining window among the open breakers.
    fn breaker_hint(&self) -> Option<Duration> {
        Target::PREFERENCE
            .into_iter()
            .map(|target| self.breaker(target).remaining_open())
            .filter(|remaining| !remaining.is_zero())
            .min()
    }
}
