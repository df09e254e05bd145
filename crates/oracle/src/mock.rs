//! Mock Oracle for testing
//!
//! Serves fixed quotes that can be changed programmatically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::OracleError;
use crate::types::{normalize, PriceOracle, Quote};

/// Mock Price Oracle for testing
pub struct MockOracle {
    /// Stored quotes (symbol -> quote)
    quotes: RwLock<HashMap<String, Quote>>,
}

impl MockOracle {
    /// Create a new empty mock oracle
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Quote `symbol` at `value`, observed now
    pub fn set_price(&self, symbol: &str, value: Decimal) {
        self.set_quote(Quote::new(symbol, value));
    }

    /// Quote `symbol` at `value`, observed at `timestamp`
    pub fn set_price_at(&self, symbol: &str, value: Decimal, timestamp: DateTime<Utc>) {
        self.set_quote(Quote::at(symbol, value, timestamp));
    }

    /// Store a prepared quote
    pub fn set_quote(&self, quote: Quote) {
        let mut quotes = self.quotes.write().unwrap_or_else(PoisonError::into_inner);
        quotes.insert(quote.symbol.clone(), quote);
    }

    /// Remove a quote (for testing the not-found path)
    pub fn remove_price(&self, symbol: &str) {
        let mut quotes = self.quotes.write().unwrap_or_else(PoisonError::into_inner);
        quotes.remove(&normalize(symbol.to_string()));
    }

    /// Number of quoted symbols
    pub fn symbol_count(&self) -> usize {
        self.quotes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceOracle for MockOracle {
    async fn quote(&self, symbol: &str) -> Result<Quote, OracleError> {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        quotes
            .get(&normalize(symbol.to_string()))
            .cloned()
            .ok_or_else(|| OracleError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn supported_symbols(&self) -> Vec<String> {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        let mut symbols: Vec<String> = quotes.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_oracle_set_price() {
        let oracle = MockOracle::new();

        assert!(oracle.quote("RIC").await.is_err());

        oracle.set_price("ric", dec!(0.25));

        let quote = oracle.quote("RIC").await.unwrap();
        assert_eq!(quote.value, dec!(0.25));
        assert_eq!(quote.source, "mock");
    }

    #[tokio::test]
    async fn test_mock_oracle_symbol_not_found() {
        let oracle = MockOracle::new();
        oracle.set_price("USDC", dec!(1));
        oracle.remove_price("usdc");

        let result = oracle.quote("USDC").await;
        assert!(matches!(result, Err(OracleError::SymbolNotFound { .. })));
        assert_eq!(oracle.symbol_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_oracle_supported_symbols() {
        let oracle = MockOracle::new();
        oracle.set_price("USDC", dec!(1));
        oracle.set_price("RIC", dec!(1));

        assert_eq!(oracle.supported_symbols().await, vec!["RIC", "USDC"]);
    }

    #[tokio::test]
    async fn test_mock_oracle_keeps_timestamp() {
        let oracle = MockOracle::new();
        let observed = Utc::now() - chrono::Duration::minutes(5);
        oracle.set_price_at("RIC", dec!(0.5), observed);

        assert_eq!(oracle.quote("ric").await.unwrap().timestamp, observed);
    }
}
