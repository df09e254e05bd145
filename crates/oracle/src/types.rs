//! Core oracle types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// A `(value, timestamp)` pair for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Asset symbol as known to the oracle
    pub symbol: String,
    /// Real price of one unit of the asset
    pub value: Decimal,
    /// When the oracle observed this value
    pub timestamp: DateTime<Utc>,
    /// Source of the quote (e.g., "mock", "chainlink")
    pub source: String,
}

impl Quote {
    /// Quote observed now
    pub fn new(symbol: impl Into<String>, value: Decimal) -> Self {
        Self::at(symbol, value, Utc::now())
    }

    /// Quote observed at `timestamp`
    pub fn at(symbol: impl Into<String>, value: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: normalize(symbol.into()),
            value,
            timestamp,
            source: "mock".to_string(),
        }
    }

    /// Seconds between observation and `now`
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.timestamp).num_seconds()
    }

    /// Check if the quote is older than `max_age_secs` at `now`
    pub fn is_stale(&self, max_age_secs: u64, now: DateTime<Utc>) -> bool {
        self.age_secs(now) > i64::try_from(max_age_secs).unwrap_or(i64::MAX)
    }

    /// Reject negative values and quotes older than `max_age_secs`
    pub fn validate(&self, max_age_secs: Option<u64>, now: DateTime<Utc>) -> Result<(), OracleError> {
        if self.value.is_sign_negative() {
            return Err(OracleError::InvalidPrice {
                symbol: self.symbol.clone(),
                reason: format!("negative value {}", self.value),
            });
        }

        match max_age_secs {
            Some(max_age_secs) if self.is_stale(max_age_secs, now) => {
                Err(OracleError::StalePrice {
                    symbol: self.symbol.clone(),
                    timestamp: self.timestamp.to_rfc3339(),
                    max_age_secs,
                })
            }
            _ => Ok(()),
        }
    }
}

pub(crate) fn normalize(symbol: String) -> String {
    symbol.trim().to_uppercase()
}

/// Price oracle trait
///
/// Implementations can be mock (for testing) or real (external APIs).
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current quote for a symbol
    async fn quote(&self, symbol: &str) -> Result<Quote, OracleError>;

    /// Symbols this oracle can quote
    async fn supported_symbols(&self) -> Vec<String>;
}
