use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of an address's signature history, as reported by the ledger.
/// The remote service owns these records; this crate only reads them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature: String,
    /// Error payload of the on-chain transaction; `None` means it succeeded.
    pub err: Option<serde_json::Value>,
    pub block_time: Option<i64>,
    pub slot: u64,
}

/// Three-way result of a timestamp lookup. "No data" and "lookup failed" are
/// different answers downstream, so this never collapses into an `Option`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimestampOutcome {
    /// Unix timestamp in seconds.
    Found(i64),
    /// The record exists but the ledger stored no block time for it.
    MissingBlockTime,
    /// No record exists, or the lookup failed after exhausting retries.
    Unavailable,
}

impl TimestampOutcome {
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            TimestampOutcome::Found(timestamp) => Some(*timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for TimestampOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampOutcome::Found(timestamp) => write!(f, "{timestamp}"),
            TimestampOutcome::MissingBlockTime => f.write_str("missing block time"),
            TimestampOutcome::Unavailable => f.write_str("unavailable"),
        }
    }
}
