use crate::domain::ports::{LedgerHandle, PeerSummary, PeerSummaryBox};
use crate::domain::summary::{PaymentsSummary, TimeRange};
use crate::error::{Result, RouterError};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_millis(500);

/// Answers summary queries from the local ledger, merged with the peer
/// replica's summary when one is configured (master role).
///
/// A failed, slow or rejected peer call degrades the answer to local data
/// only; it is never reported to the caller and never retried.
pub struct SummaryService {
    ledger: LedgerHandle,
    peer: Option<PeerSummaryBox>,
    peer_timeout: Duration,
}

impl SummaryService {
    /// Local-only summaries (slave role).
    pub fn local(ledger: LedgerHandle) -> Self {
        Self {
            ledger,
            peer: None,
            peer_timeout: DEFAULT_PEER_TIMEOUT,
        }
    }

    /// Local summaries merged with `peer` (master role).
    pub fn with_peer(ledger: LedgerHandle, peer: PeerSummaryBox, peer_timeout: Duration) -> Self {
        Self {
            ledger,
            peer: Some(peer),
            peer_timeout,
        }
    }

    /// Full-precision summary for `range`. Round with
    /// [`PaymentsSummary::rounded`] before presenting it.
    pub async fn summarize(&self, range: &TimeRange) -> Result<PaymentsSummary> {
        let mut summary = self.ledger.summarize(range).await?;

        if let Some(peer) = &self.peer {
            let merged = self
                .fetch_peer(peer.as_ref(), range)
                .await
                .and_then(|remote| summary.merge(&remote));
            if let Err(e) = merged {
                warn!(error = %e, "peer summary unavailable, answering with local data");
            }
        }

        Ok(summary)
    }

    async fn fetch_peer(&self, peer: &dyn PeerSummary, range: &TimeRange) -> Result<PaymentsSummary> {
        tokio::time::timeout(self.peer_timeout, peer.fetch(range))
            .await
            .map_err(|_| RouterError::PeerTimeout)?
    }
}
