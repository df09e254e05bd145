//! Oracle error types

use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Error)]
pub enum OracleError {
    /// No quote for the symbol
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    /// Quote is older than the accepted age
    #[error("Stale quote for {symbol}: quoted at {timestamp}, max age is {max_age_secs}s")]
    StalePrice {
        symbol: String,
        timestamp: String,
        max_age_secs: u64,
    },

    /// Quote value is unusable
    #[error("Invalid quote for {symbol}: {reason}")]
    InvalidPrice { symbol: String, reason: String },

    /// External oracle connection failed
    #[error("Oracle connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
