//! Bank configuration
//!
//! Set once when the bank is created and never changed afterward. Values can
//! come from a TOML file so deployments can be tuned without recompiling.
//!
//! ```toml
//! name = "Test Bank"
//! interest_rate = 200          # basis points per year (2%)
//! collateralization_ratio = 150 # percent
//! liquidation_penalty = 25      # percent surcharge on seized collateral
//! max_price_age_secs = 3600     # optional
//! ```

use flowbank_core::{RateError, RateTranslator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Immutable bank parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Display name of the bank
    pub name: String,

    /// Yearly interest rate in basis points (200 = 2%)
    pub interest_rate: u32,

    /// Minimum collateral value over debt value, in percent (150 = 150%)
    pub collateralization_ratio: u32,

    /// Surcharge on seized collateral, in percent (25 = 25%)
    pub liquidation_penalty: u32,

    /// Oracle quotes older than this are refused
    #[serde(default)]
    pub max_price_age_secs: Option<u64>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            name: "FlowBank".to_string(),
            interest_rate: 200,
            collateralization_ratio: 150,
            liquidation_penalty: 25,
            max_price_age_secs: None,
        }
    }
}

impl BankConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), bank = %config.name, "Loaded bank configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BankConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("bank name is empty".to_string()));
        }

        if self.interest_rate == 0 {
            return Err(ConfigError::Validation(
                "interest_rate must be positive".to_string(),
            ));
        }

        if self.collateralization_ratio < 100 {
            return Err(ConfigError::Validation(format!(
                "collateralization_ratio must be at least 100, got {}",
                self.collateralization_ratio
            )));
        }

        if self.liquidation_penalty > 100 {
            return Err(ConfigError::Validation(format!(
                "liquidation_penalty must be at most 100, got {}",
                self.liquidation_penalty
            )));
        }

        Ok(())
    }

    /// Rate translator for this bank's interest rate
    pub fn translator(&self) -> Result<RateTranslator, RateError> {
        RateTranslator::new(self.interest_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = BankConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interest_rate, 200);
        assert_eq!(config.collateralization_ratio, 150);
        assert_eq!(config.liquidation_penalty, 25);
    }

    #[test]
    fn test_parse_toml() {
        let config = BankConfig::from_toml_str(
            r#"
            name = "Test Bank"
            interest_rate = 200
            collateralization_ratio = 150
            liquidation_penalty = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "Test Bank");
        assert_eq!(config.max_price_age_secs, None);
        assert_eq!(config.translator().unwrap().interest_rate(), 200);
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let zero_rate = BankConfig {
            interest_rate: 0,
            ..BankConfig::default()
        };
        assert!(matches!(zero_rate.validate(), Err(ConfigError::Validation(_))));

        let low_ratio = BankConfig {
            collateralization_ratio: 90,
            ..BankConfig::default()
        };
        assert!(matches!(low_ratio.validate(), Err(ConfigError::Validation(_))));

        let huge_penalty = BankConfig {
            liquidation_penalty: 101,
            ..BankConfig::default()
        };
        assert!(matches!(huge_penalty.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let result = BankConfig::from_toml_str("name = \"Bank\"\ninterest_rate = 200\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "name = \"File Bank\"\ninterest_rate = 500\ncollateralization_ratio = 200\nliquidation_penalty = 10\nmax_price_age_secs = 60"
        )?;

        let config = BankConfig::load_file(file.path())?;
        assert_eq!(config.name, "File Bank");
        assert_eq!(config.max_price_age_secs, Some(60));

        assert!(matches!(
            BankConfig::load_file("/definitely/not/here.toml"),
            Err(ConfigError::NotFound(_))
        ));
        Ok(())
    }
}
