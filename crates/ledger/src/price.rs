//! Price cache
//!
//! Two slots, one for the collateral asset and one for the debt asset. A
//! price is stored as an integer numerator over the asset's granularity:
//! with granularity 1000, a stored price of 250 means 0.25.

use chrono::{DateTime, Utc};
use flowbank_core::Address;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::LedgerError;

/// Which side of the loan an asset is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Collateral,
    Debt,
}

/// Last reported price of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Token contract of the asset
    pub token: Address,
    /// Oracle symbol used to look the asset up
    pub symbol: String,
    /// Fixed-point divisor for `price`
    pub granularity: u64,
    /// Price numerator (real price = price / granularity)
    pub price: u64,
    /// Timestamp of the quote the price came from (None for the initial price)
    pub reported_at: Option<DateTime<Utc>>,
}

impl PriceRecord {
    pub fn new(
        token: Address,
        symbol: impl Into<String>,
        granularity: u64,
        price: u64,
    ) -> Result<Self, LedgerError> {
        if granularity == 0 {
            return Err(LedgerError::InvalidGranularity);
        }

        Ok(Self {
            token,
            symbol: symbol.into(),
            granularity,
            price,
            reported_at: None,
        })
    }

    /// Real price as a decimal
    pub fn real_price(&self) -> Decimal {
        Decimal::from(self.price) / Decimal::from(self.granularity)
    }

    /// Convert a real price into this record's integer numerator (truncating)
    pub fn numerator_for(&self, role: AssetRole, value: Decimal) -> Result<u64, LedgerError> {
        if value.is_sign_negative() {
            return Err(LedgerError::InvalidPrice {
                role,
                reason: format!("negative value {value}"),
            });
        }

        value
            .checked_mul(Decimal::from(self.granularity))
            .and_then(|scaled| scaled.trunc().to_u64())
            .ok_or_else(|| LedgerError::InvalidPrice {
                role,
                reason: format!("{value} does not fit granularity {}", self.granularity),
            })
    }
}

/// Cached prices for both assets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCache {
    collateral: Option<PriceRecord>,
    debt: Option<PriceRecord>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the record for an asset
    pub fn configure(&mut self, role: AssetRole, record: PriceRecord) {
        *self.slot_mut(role) = Some(record);
    }

    /// Record for an asset, if configured
    pub fn get(&self, role: AssetRole) -> Result<&PriceRecord, LedgerError> {
        self.slot(role)
            .as_ref()
            .ok_or(LedgerError::AssetNotConfigured(role))
    }

    pub fn collateral(&self) -> Result<&PriceRecord, LedgerError> {
        self.get(AssetRole::Collateral)
    }

    pub fn debt(&self) -> Result<&PriceRecord, LedgerError> {
        self.get(AssetRole::Debt)
    }

    /// Store a newly reported price.
    ///
    /// A report older than the cached one is refused rather than applied out
    /// of order. Returns the previous numerator.
    pub fn update(
        &mut self,
        role: AssetRole,
        price: u64,
        reported_at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let record = self
            .slot_mut(role)
            .as_mut()
            .ok_or(LedgerError::AssetNotConfigured(role))?;

        if let Some(cached) = record.reported_at {
            if reported_at < cached {
                return Err(LedgerError::StalePrice {
                    role,
                    reported: reported_at.to_rfc3339(),
                    cached: cached.to_rfc3339(),
                });
            }
        }

        let previous = record.price;
        record.price = price;
        record.reported_at = Some(reported_at);
        Ok(previous)
    }

    fn slot(&self, role: AssetRole) -> &Option<PriceRecord> {
        match role {
            AssetRole::Collateral => &self.collateral,
            AssetRole::Debt => &self.debt,
        }
    }

    fn slot_mut(&mut self, role: AssetRole) -> &mut Option<PriceRecord> {
        match role {
            AssetRole::Collateral => &mut self.collateral,
            AssetRole::Debt => &mut self.debt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn ric() -> PriceRecord {
        PriceRecord::new(Address::new("ric").unwrap(), "ric", 1000, 1000).unwrap()
    }

    #[test]
    fn test_zero_granularity_rejected() {
        let result = PriceRecord::new(Address::new("ric").unwrap(), "ric", 0, 1000);
        assert_eq!(result, Err(LedgerError::InvalidGranularity));
    }

    #[test]
    fn test_real_price() {
        let mut record = ric();
        record.price = 250;
        assert_eq!(record.real_price(), dec!(0.25));
    }

    #[test]
    fn test_numerator_for_truncates() {
        let record = ric();
        assert_eq!(record.numerator_for(AssetRole::Collateral, dec!(0.25)), Ok(250));
        assert_eq!(record.numerator_for(AssetRole::Collateral, dec!(1.2349)), Ok(1234));
        assert!(record
            .numerator_for(AssetRole::Collateral, dec!(-1))
            .is_err());
    }

    #[test]
    fn test_unconfigured_asset() {
        let cache = PriceCache::new();
        assert_eq!(
            cache.collateral(),
            Err(LedgerError::AssetNotConfigured(AssetRole::Collateral))
        );
    }

    #[test]
    fn test_update_refuses_out_of_order_reports() {
        let mut cache = PriceCache::new();
        cache.configure(AssetRole::Collateral, ric());

        let now = Utc::now();
        assert_eq!(cache.update(AssetRole::Collateral, 500, now), Ok(1000));

        let earlier = now - Duration::seconds(30);
        let result = cache.update(AssetRole::Collateral, 250, earlier);
        assert!(matches!(result, Err(LedgerError::StalePrice { .. })));
        assert_eq!(cache.collateral().unwrap().price, 500);
    }

    #[test]
    fn test_asset_role_display() {
        assert_eq!(AssetRole::Collateral.to_string(), "collateral");
        assert_eq!("debt".parse::<AssetRole>().unwrap(), AssetRole::Debt);
    }
}
