//! Application layer: dispatch and resilience.
//!
//! `PaymentEngine` is the accept-path entry point. It hands each request to a
//! bounded `WorkerPool` whose workers run the `PaymentRouter` retry loop and
//! append the outcome to the ledger. `SummaryService` answers summary queries,
//! fanning out to the peer replica when running as master.

pub mod engine;
pub mod pool;
pub mod retry;
pub mod router;
pub mod summary;
