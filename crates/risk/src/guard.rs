//! Collateralization guard
//!
//! A vault is healthy when
//!
//! `collateral * collateral_price * 100 >= debt * debt_price * required_ratio`
//!
//! with both prices real (numerator / granularity). The comparison is done on
//! integers by cross-multiplying the granularities, so no precision is lost.
//! A vault without debt is always healthy and needs no prices at all.

use flowbank_ledger::{PriceCache, PriceRecord, Vault};
use rust_decimal::Decimal;

use crate::error::RiskError;

/// Evaluates vaults against the cached prices. Never mutates anything.
#[derive(Debug, Clone, Copy)]
pub struct CollateralGuard<'a> {
    prices: &'a PriceCache,
    required_ratio: u32,
}

/// Both sides of the health comparison, scaled to a common denominator
struct Valuation {
    /// collateral * cp * dg
    collateral_value: u128,
    /// debt * dp * cg
    debt_value: u128,
}

impl<'a> CollateralGuard<'a> {
    /// Guard requiring `required_ratio` percent of collateral value over debt value
    pub fn new(prices: &'a PriceCache, required_ratio: u32) -> Self {
        Self {
            prices,
            required_ratio,
        }
    }

    pub fn required_ratio(&self) -> u32 {
        self.required_ratio
    }

    /// Whether `vault` satisfies the required ratio at current prices.
    ///
    /// Call with the state the vault *would* have after a mutation.
    pub fn is_healthy(&self, vault: &Vault) -> Result<bool, RiskError> {
        if !vault.has_debt() {
            return Ok(true);
        }

        let valuation = self.valuate(vault)?;
        let lhs = valuation
            .collateral_value
            .checked_mul(100)
            .ok_or(RiskError::Overflow("collateral value"))?;
        let rhs = valuation
            .debt_value
            .checked_mul(u128::from(self.required_ratio))
            .ok_or(RiskError::Overflow("debt value"))?;

        Ok(lhs >= rhs)
    }

    /// Collateralization in hundredths of a percent (15000 = 150%).
    ///
    /// `None` when the ratio is unbounded (no debt, or a zero debt price).
    pub fn ratio_bps(&self, vault: &Vault) -> Result<Option<u128>, RiskError> {
        if !vault.has_debt() {
            return Ok(None);
        }

        let valuation = self.valuate(vault)?;
        if valuation.debt_value == 0 {
            return Ok(None);
        }

        valuation
            .collateral_value
            .checked_mul(100 * 100)
            .map(|scaled| Some(scaled / valuation.debt_value))
            .ok_or(RiskError::Overflow("collateralization ratio"))
    }

    /// Collateralization as a percentage with two decimals (e.g. `500.00`)
    pub fn ratio_percent(&self, vault: &Vault) -> Result<Option<Decimal>, RiskError> {
        let Some(bps) = self.ratio_bps(vault)? else {
            return Ok(None);
        };

        i128::try_from(bps)
            .ok()
            .and_then(|bps| Decimal::try_from_i128_with_scale(bps, 2).ok())
            .map(Some)
            .ok_or(RiskError::Overflow("collateralization ratio"))
    }

    fn valuate(&self, vault: &Vault) -> Result<Valuation, RiskError> {
        let collateral = self.prices.collateral()?;
        let debt = self.prices.debt()?;

        Ok(Valuation {
            collateral_value: scaled_value(vault.collateral.value(), collateral, debt)
                .ok_or(RiskError::Overflow("collateral value"))?,
            debt_value: scaled_value(vault.debt.value(), debt, collateral)
                .ok_or(RiskError::Overflow("debt value"))?,
        })
    }
}

/// `amount * own.price * other.granularity`
fn scaled_value(amount: u128, own: &PriceRecord, other: &PriceRecord) -> Option<u128> {
    amount
        .checked_mul(u128::from(own.price))?
        .checked_mul(u128::from(other.granularity))
}
