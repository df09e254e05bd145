//! Liquidation engine
//!
//! Two ways into a liquidation:
//! - `Undercollateralized`: anyone may ask, but only a vault the guard
//!   rejects at current prices is closed.
//! - `StreamDefault`: the borrower's payment stream is gone. Any debt is
//!   closed unconditionally, regardless of the current ratio.
//!
//! Either way the debt is zeroed and
//! `debt * debt_price * (100 + penalty) / (100 * collateral_price)` of
//! collateral moves into the reserve, capped at what the vault holds.

use flowbank_core::{Address, Amount};
use flowbank_ledger::{BankConfig, LedgerError, LedgerState, PriceCache, Vault};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::info;

use crate::error::RiskError;
use crate::guard::CollateralGuard;

/// Why a vault is being liquidated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LiquidationTrigger {
    Undercollateralized,
    StreamDefault,
}

/// Liquidation state of a vault at current prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    Healthy,
    Liquidatable,
    /// Debt was forced to zero by a liquidation
    Closed,
}

/// Outcome of a liquidation, computed before anything is mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPlan {
    pub user: Address,
    pub trigger: LiquidationTrigger,
    /// Debt written off
    pub debt_cleared: Amount,
    /// Collateral moved to the reserve
    pub collateral_seized: Amount,
    /// True when the penalty-adjusted amount exceeded the vault's collateral
    pub capped: bool,
}

impl LiquidationPlan {
    /// Nothing to seize and nothing to clear
    pub fn is_empty(&self) -> bool {
        self.debt_cleared.is_zero() && self.collateral_seized.is_zero()
    }
}

/// Liquidation engine
#[derive(Debug, Clone, Copy)]
pub struct LiquidationEngine {
    required_ratio: u32,
    penalty: u32,
}

impl LiquidationEngine {
    /// Create an engine for a required ratio and penalty (both percent)
    pub fn new(required_ratio: u32, penalty: u32) -> Self {
        Self {
            required_ratio,
            penalty,
        }
    }

    pub fn from_config(config: &BankConfig) -> Self {
        Self::new(config.collateralization_ratio, config.liquidation_penalty)
    }

    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    /// Guard sharing this engine's threshold
    pub fn guard<'a>(&self, prices: &'a PriceCache) -> CollateralGuard<'a> {
        CollateralGuard::new(prices, self.required_ratio)
    }

    /// Current status of a vault
    pub fn status(&self, prices: &PriceCache, vault: &Vault) -> Result<VaultStatus, RiskError> {
        if !vault.has_debt() {
            return Ok(if vault.closed {
                VaultStatus::Closed
            } else {
                VaultStatus::Healthy
            });
        }

        if self.guard(prices).is_healthy(vault)? {
            Ok(VaultStatus::Healthy)
        } else {
            Ok(VaultStatus::Liquidatable)
        }
    }

    /// Plan the liquidation of `user` against `state`.
    ///
    /// Fails with `NotUndercollateralized` when triggered on demand against a
    /// healthy vault. A stream default on a vault without debt yields an empty
    /// plan.
    pub fn plan(
        &self,
        state: &LedgerState,
        user: &Address,
        trigger: LiquidationTrigger,
    ) -> Result<LiquidationPlan, RiskError> {
        let vault = state.vaults.get(user);

        if trigger == LiquidationTrigger::Undercollateralized
            && self.status(&state.prices, &vault)? != VaultStatus::Liquidatable
        {
            return Err(RiskError::NotUndercollateralized(user.clone()));
        }

        let (collateral_seized, capped) = if vault.has_debt() {
            self.seizure(&state.prices, &vault)?
        } else {
            (Amount::ZERO, false)
        };

        Ok(LiquidationPlan {
            user: user.clone(),
            trigger,
            debt_cleared: vault.debt,
            collateral_seized,
            capped,
        })
    }

    /// Apply a plan: zero the debt, close the vault, move seized collateral
    /// into the reserve.
    pub fn apply(&self, state: &mut LedgerState, plan: &LiquidationPlan) -> Result<(), RiskError> {
        let vault = state.vaults.get(&plan.user);
        if vault.debt != plan.debt_cleared {
            return Err(RiskError::Ledger(LedgerError::RepaymentExceedsDebt {
                debt: vault.debt,
                repayment: plan.debt_cleared,
            }));
        }

        state.vaults.withdraw(&plan.user, plan.collateral_seized)?;
        state.vaults.close(&plan.user);
        state.reserve.credit_collateral(plan.collateral_seized)?;

        info!(
            user = %plan.user,
            trigger = %plan.trigger,
            debt_cleared = %plan.debt_cleared,
            collateral_seized = %plan.collateral_seized,
            capped = plan.capped,
            "Vault liquidated"
        );
        Ok(())
    }

    /// Borrowers whose vaults are liquidatable at current prices
    pub fn liquidatable(&self, state: &LedgerState) -> Result<Vec<Address>, RiskError> {
        let mut found = Vec::new();
        for user in state.vaults.borrowers() {
            if self.status(&state.prices, &state.vaults.get(&user))? == VaultStatus::Liquidatable {
                found.push(user);
            }
        }
        Ok(found)
    }

    /// Penalty-adjusted collateral for the vault's debt, capped at its collateral
    fn seizure(&self, prices: &PriceCache, vault: &Vault) -> Result<(Amount, bool), RiskError> {
        let collateral = prices.collateral()?;
        let debt = prices.debt()?;

        let numerator = vault
            .debt
            .value()
            .checked_mul(u128::from(debt.price))
            .and_then(|v| v.checked_mul(u128::from(100 + self.penalty)))
            .and_then(|v| v.checked_mul(u128::from(collateral.granularity)))
            .ok_or(RiskError::Overflow("seized collateral"))?;
        let denominator = 100u128
            .checked_mul(u128::from(collateral.price))
            .and_then(|v| v.checked_mul(u128::from(debt.granularity)))
            .ok_or(RiskError::Overflow("seized collateral"))?;

        // worthless collateral: everything goes
        if denominator == 0 {
            return Ok((vault.collateral, true));
        }

        let owed = Amount::new(numerator / denominator);
        if owed > vault.collateral {
            Ok((vault.collateral, true))
        } else {
            Ok((owed, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbank_ledger::{AssetRole, PriceRecord};

    fn alice() -> Address {
        Address::new("alice").unwrap()
    }

    fn state(collateral: u128, debt: u128, collateral_price: u64) -> LedgerState {
        let mut state = LedgerState::new();
        state.prices.configure(
            AssetRole::Collateral,
            PriceRecord::new(Address::new("ric").unwrap(), "ric", 1000, collateral_price).unwrap(),
        );
        state.prices.configure(
            AssetRole::Debt,
            PriceRecord::new(Address::new("usdc").unwrap(), "usdc", 1000, 1000).unwrap(),
        );
        state
            .vaults
            .put(&alice(), Vault::new(Amount::new(collateral), Amount::new(debt)));
        state
    }

    fn engine() -> LiquidationEngine {
        LiquidationEngine::new(150, 25)
    }

    #[test]
    fn test_healthy_vault_is_refused() {
        let state = state(5000, 1000, 500);
        let result = engine().plan(&state, &alice(), LiquidationTrigger::Undercollateralized);
        assert_eq!(result, Err(RiskError::NotUndercollateralized(alice())));
    }

    #[test]
    fn test_underwater_vault_seizes_penalty_adjusted_collateral() {
        let mut state = state(5000, 1000, 250);
        let engine = engine();

        let plan = engine
            .plan(&state, &alice(), LiquidationTrigger::Undercollateralized)
            .unwrap();
        // 1000 * 1.25 / 0.25
        assert_eq!(plan.collateral_seized, Amount::new(5000));
        assert_eq!(plan.debt_cleared, Amount::new(1000));
        assert!(!plan.capped);

        engine.apply(&mut state, &plan).unwrap();
        let vault = state.vaults.get(&alice());
        assert_eq!(vault.debt, Amount::ZERO);
        assert_eq!(vault.collateral, Amount::ZERO);
        assert!(vault.closed);
        assert_eq!(state.reserve.collateral_balance, Amount::new(5000));
        assert_eq!(
            engine.status(&state.prices, &vault).unwrap(),
            VaultStatus::Closed
        );
    }

    #[test]
    fn test_seizure_is_capped_at_collateral() {
        let state = state(4000, 1000, 200);
        let plan = engine()
            .plan(&state, &alice(), LiquidationTrigger::Undercollateralized)
            .unwrap();
        assert_eq!(plan.collateral_seized, Amount::new(4000));
        assert!(plan.capped);
    }

    #[test]
    fn test_stream_default_ignores_ratio() {
        let state = state(5000, 1000, 1000);
        let engine = engine();
        assert_eq!(
            engine.status(&state.prices, &state.vaults.get(&alice())).unwrap(),
            VaultStatus::Healthy
        );

        let plan = engine
            .plan(&state, &alice(), LiquidationTrigger::StreamDefault)
            .unwrap();
        assert_eq!(plan.collateral_seized, Amount::new(1250));
    }

    #[test]
    fn test_stream_default_without_debt_is_empty() {
        let state = state(5000, 0, 1000);
        let plan = engine()
            .plan(&state, &alice(), LiquidationTrigger::StreamDefault)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_worthless_collateral_is_fully_seized() {
        let state = state(700, 1000, 0);
        let plan = engine()
            .plan(&state, &alice(), LiquidationTrigger::Undercollateralized)
            .unwrap();
        assert_eq!(plan.collateral_seized, Amount::new(700));
        assert!(plan.capped);
    }

    #[test]
    fn test_liquidatable_lists_underwater_vaults() {
        let mut state = state(5000, 1000, 250);
        let bob = Address::new("bob").unwrap();
        state
            .vaults
            .put(&bob, Vault::new(Amount::new(50_000), Amount::new(1000)));

        assert_eq!(engine().liquidatable(&state).unwrap(), vec![alice()]);
    }

    #[test]
    fn test_stale_plan_is_rejected() {
        let mut state = state(5000, 1000, 250);
        let engine = engine();
        let plan = engine
            .plan(&state, &alice(), LiquidationTrigger::Undercollateralized)
            .unwrap();

        state.vaults.set_debt(&alice(), Amount::new(10));
        let before = state.clone();
        assert!(engine.apply(&mut state, &plan).is_err());
        assert_eq!(state, before);
    }
}
