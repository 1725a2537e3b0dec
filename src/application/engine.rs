use super::pool::WorkerPool;
use super::router::PaymentRouter;
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::LedgerHandle;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The accept-path entry point for payments.
///
/// `PaymentEngine` hands each accepted request to the worker pool, where it is
/// routed and, once a processor accepts it, appended to the ledger. The caller
/// is never told about the outcome.
pub struct PaymentEngine {
    pool: WorkerPool,
    router: Arc<PaymentRouter>,
    ledger: LedgerHandle,
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Bounded pool the routing work runs on.
    /// * `router` - Routing and retry state machine shared by all workers.
    /// * `ledger` - Destination for successfully routed payments.
    pub fn new(pool: WorkerPool, router: PaymentRouter, ledger: LedgerHandle) -> Self {
        Self {
            pool,
            router: Arc::new(router),
            ledger,
        }
    }

    /// Queues the payment for routing. Never blocks; under overload the
    /// payment is dropped by the pool.
    pub fn submit(&self, request: PaymentRequest) {
        let router = self.router.clone();
        let ledger = self.ledger.clone();

        self.pool.submit(async move {
            let record = match router.process(&request).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(correlation_id = %request.correlation_id, error = %e, "payment abandoned");
                    return;
                }
            };

            debug!(amount = %record.amount.value(), target = %record.target, "payment processed");
            if let Err(e) = ledger.append(record).await {
                warn!(correlation_id = %request.correlation_id, error = %e, "failed to record payment");
            }
        });
    }

    pub fn router(&self) -> &PaymentRouter {
        &self.router
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Stops accepting work and waits for in-flight payments to finish.
    pub async fn shutdown(&self) {
        info!(queued = self.pool.queued(), "draining worker pool");
        self.pool.wait().await;
        info!(dropped = self.pool.dropped(), "worker pool drained");
    }
}
