use crate::domain::payment::PaymentRecord;
use crate::domain::ports::Ledger;
use crate::domain::summary::{PaymentsSummary, TimeRange};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger of routed payments.
///
/// Uses `Arc<RwLock<Vec<PaymentRecord>>>`: appends take the write lock, so
/// none is lost or torn, and summaries scan under the read lock. Records are
/// kept for the lifetime of the process.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn append(&self, record: PaymentRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn summarize(&self, range: &TimeRange) -> Result<PaymentsSummary> {
        let records = self.records.read().await;
        PaymentsSummary::tally(
            records
                .iter()
                .filter(|record| range.contains(record.timestamp)),
        )
    }
}
