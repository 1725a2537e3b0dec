use crate::error::RouterError;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// The two payment processors a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Default,
    Fallback,
}

impl Target {
    /// Preference order, re-evaluated on every routing round.
    pub const PREFERENCE: [Target; 2] = [Target::Default, Target::Fallback];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Default => "default",
            Target::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest amount a single payment may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Represents a positive monetary amount of at most [`MAX_AMOUNT`].
///
/// Validation happens on construction and on deserialization, so a
/// `PaymentRequest` holding an `Amount` is always routable.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, RouterError> {
        if value <= Decimal::ZERO {
            return Err(RouterError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        if value > MAX_AMOUNT {
            return Err(RouterError::Validation(format!(
                "Amount must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = RouterError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// Processors and peers exchange amounts as JSON numbers.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

/// Caller-supplied payment, immutable once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub correlation_id: String,
    pub amount: Amount,
}

/// The body sent to a processor on a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEnvelope {
    pub correlation_id: String,
    pub amount: Amount,
    pub requested_at: DateTime<Utc>,
}

impl PaymentEnvelope {
    /// Stamps a request for an attempt made at `now`.
    ///
    /// The timestamp is truncated to milliseconds so the instant recorded in
    /// the ledger is exactly the one rendered on the wire.
    pub fn stamp(request: &PaymentRequest, now: DateTime<Utc>) -> Self {
        Self {
            correlation_id: request.correlation_id.clone(),
            amount: request.amount,
            requested_at: now.trunc_subsecs(3),
        }
    }

    pub fn into_record(self, target: Target) -> PaymentRecord {
        PaymentRecord {
            timestamp: self.requested_at,
            amount: self.amount,
            target,
        }
    }
}

/// A successfully routed payment. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub timestamp: DateTime<Utc>,
    pub amount: Amount,
    pub target: Target,
}
