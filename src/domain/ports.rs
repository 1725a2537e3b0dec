use super::payment::PaymentEnvelope;
use super::payment::PaymentRecord;
use super::summary::{PaymentsSummary, TimeRange};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A payment processor reachable for delivery attempts.
///
/// `Ok(())` means the processor accepted the payment; any error is a failed
/// attempt and is charged to that target's breaker.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn deliver(&self, envelope: &PaymentEnvelope) -> Result<()>;
}

/// Append-only history of routed payments.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn append(&self, record: PaymentRecord) -> Result<()>;
    async fn summarize(&self, range: &TimeRange) -> Result<PaymentsSummary>;
}

/// Summary of a peer replica's ledger.
#[async_trait]
pub trait PeerSummary: Send + Sync {
    async fn fetch(&self, range: &TimeRange) -> Result<PaymentsSummary>;
}

#[async_trait]
impl<T: PaymentProcessor + ?Sized> PaymentProcessor for Arc<T> {
    async fn deliver(&self, envelope: &PaymentEnvelope) -> Result<()> {
        (**self).deliver(envelope).await
    }
}

pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
pub type LedgerHandle = Arc<dyn Ledger>;
pub type PeerSummaryBox = Box<dyn PeerSummary>;
