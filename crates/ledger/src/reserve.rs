//! Reserve ledger - the bank's own liquidity

use flowbank_core::Amount;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Lendable debt-asset liquidity and collateral seized by liquidation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveState {
    /// Debt asset available for lending
    pub balance: Amount,
    /// Collateral seized from liquidated vaults, awaiting withdrawal
    pub collateral_balance: Amount,
}

impl ReserveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add liquidity (owner deposit or borrower repayment)
    pub fn credit(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        self.balance = self
            .balance
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow("reserve balance"))?;
        Ok(self.balance)
    }

    /// Remove liquidity (owner withdrawal or a loan payout).
    ///
    /// Never clamps: taking more than the balance is an error.
    pub fn debit(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        self.balance =
            self.balance
                .checked_sub(&amount)
                .ok_or(LedgerError::InsufficientReserves {
                    available: self.balance,
                    required: amount,
                })?;
        Ok(self.balance)
    }

    /// Take seized collateral into the reserve
    pub fn credit_collateral(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        self.collateral_balance = self
            .collateral_balance
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow("reserve collateral"))?;
        Ok(self.collateral_balance)
    }

    /// Release seized collateral
    pub fn debit_collateral(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        self.collateral_balance = self.collateral_balance.checked_sub(&amount).ok_or(
            LedgerError::InsufficientReserveCollateral {
                available: self.collateral_balance,
                requested: amount,
            },
        )?;
        Ok(self.collateral_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_starts_empty() {
        let reserve = ReserveState::new();
        assert!(reserve.balance.is_zero());
        assert!(reserve.collateral_balance.is_zero());
    }

    #[test]
    fn test_debit_rejects_overdraw() {
        let mut reserve = ReserveState::new();
        reserve.credit(Amount::new(400)).unwrap();

        let result = reserve.debit(Amount::new(500));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientReserves {
                available: Amount::new(400),
                required: Amount::new(500),
            })
        );
        assert_eq!(reserve.balance, Amount::new(400));

        assert_eq!(reserve.debit(Amount::new(400)), Ok(Amount::ZERO));
    }

    #[test]
    fn test_collateral_side_is_separate() {
        let mut reserve = ReserveState::new();
        reserve.credit(Amount::new(10)).unwrap();
        reserve.credit_collateral(Amount::new(1250)).unwrap();

        assert_eq!(reserve.debit_collateral(Amount::new(250)), Ok(Amount::new(1000)));
        assert!(matches!(
            reserve.debit_collateral(Amount::new(1001)),
            Err(LedgerError::InsufficientReserveCollateral { .. })
        ));
        assert_eq!(reserve.balance, Amount::new(10));
    }
}
