use super::payment::{PaymentRecord, Target};
use crate::error::{Result, RouterError};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Inclusive time window over ledger timestamps. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Parses RFC3339 query bounds. Empty strings count as absent.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        Ok(Self {
            from: parse_bound(from, "from")?,
            to: parse_bound(to, "to")?,
        })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| timestamp >= from) && self.to.is_none_or(|to| timestamp <= to)
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|_| RouterError::Validation(format!("invalid {name} timestamp"))),
    }
}

/// Count and amount routed to one target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_requests: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl Summary {
    pub fn new(total_requests: u64, total_amount: Decimal) -> Self {
        Self {
            total_requests,
            total_amount,
        }
    }

    fn checked_add(&self, requests: u64, amount: Decimal) -> Result<Summary> {
        Ok(Self {
            total_requests: self
                .total_requests
                .checked_add(requests)
                .ok_or(RouterError::SummaryOverflow)?,
            total_amount: self
                .total_amount
                .checked_add(amount)
                .ok_or(RouterError::SummaryOverflow)?,
        })
    }
}

/// Per-target aggregate, the body of a summary response.
///
/// Amounts accumulate in full precision; [`PaymentsSummary::rounded`] is the
/// single place where cents rounding is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentsSummary {
    pub default: Summary,
    pub fallback: Summary,
}

impl PaymentsSummary {
    pub fn target(&self, target: Target) -> &Summary {
        match target {
            Target::Default => &self.default,
            Target::Fallback => &self.fallback,
        }
    }

    fn target_mut(&mut self, target: Target) -> &mut Summary {
        match target {
            Target::Default => &mut self.default,
            Target::Fallback => &mut self.fallback,
        }
    }

    /// Sums `records` per target.
    pub fn tally<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let mut summary = Self::default();
        for record in records {
            summary.record(record)?;
        }
        Ok(summary)
    }

    pub fn record(&mut self, record: &PaymentRecord) -> Result<()> {
        let summary = self.target_mut(record.target);
        *summary = summary.checked_add(1, record.amount.value())?;
        Ok(())
    }

    /// Adds another replica's counts into this one. Left untouched on error.
    pub fn merge(&mut self, other: &PaymentsSummary) -> Result<()> {
        let default = self
            .default
            .checked_add(other.default.total_requests, other.default.total_amount)?;
        let fallback = self
            .fallback
            .checked_add(other.fallback.total_requests, other.fallback.total_amount)?;
        self.default = default;
        self.fallback = fallback;
        Ok(())
    }

    /// Presentation form: amounts rounded half away from zero to cents.
    pub fn rounded(&self) -> Self {
        let round = |s: &Summary| Summary {
            total_requests: s.total_requests,
            total_amount: s
                .total_amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        };
        Self {
            default: round(&self.default),
            fallback: round(&self.fallback),
        }
    }
}
