use crate::domain::payment::PaymentEnvelope;
use crate::domain::ports::{PaymentProcessor, PeerSummary};
use crate::domain::summary::{PaymentsSummary, TimeRange};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use chrono::SecondsFormat;
use std::time::Duration;

/// A payment processor reached over HTTP at `{base_url}/payments`.
///
/// Any 2xx answer is an accepted payment; other statuses, transport errors
/// and timeouts are failed attempts.
pub struct HttpProcessor {
    pub base_url: String,
    pub timeout: Duration,
    pub client: reqwest::Client,
}

impl HttpProcessor {
    pub fn new(base_url: impl Into<String>, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            client,
        }
    }
}

#[async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn deliver(&self, envelope: &PaymentEnvelope) -> Result<()> {
        let url = format!("{}/payments", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .json(envelope)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RouterError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

/// The peer replica's `/payments-summary` endpoint.
pub struct HttpPeer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl HttpPeer {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

/// Query parameters carrying the same bounds the caller asked for.
fn range_query(range: &TimeRange) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(2);
    if let Some(from) = range.from {
        query.push(("from", from.to_rfc3339_opts(SecondsFormat::AutoSi, true)));
    }
    if let Some(to) = range.to {
        query.push(("to", to.to_rfc3339_opts(SecondsFormat::AutoSi, true)));
    }
    query
}

#[async_trait]
impl PeerSummary for HttpPeer {
    async fn fetch(&self, range: &TimeRange) -> Result<PaymentsSummary> {
        let url = format!("{}/payments-summary", self.base_url.trim_end_matches('/'));
        let resp = self.client.get(url).query(&range_query(range)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RouterError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<PaymentsSummary>().await?)
    }
}
