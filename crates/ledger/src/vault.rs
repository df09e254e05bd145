//! Vault store - per-borrower collateral and debt
//!
//! A vault exists for every address that ever touched the bank. Vaults are
//! never removed; a repaid or liquidated vault is simply zeroed.

use flowbank_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;

/// A borrower's collateral and debt record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Collateral held in custody for the borrower
    pub collateral: Amount,
    /// Debt owed, in debt-asset units (interest is paid by stream, not accrued)
    pub debt: Amount,
    /// Set when the debt was forced to zero by liquidation. Any later deposit
    /// or borrow reopens the vault.
    pub closed: bool,
}

impl Vault {
    /// Vault with the given balances
    pub fn new(collateral: Amount, debt: Amount) -> Self {
        Self {
            collateral,
            debt,
            closed: false,
        }
    }

    pub fn has_debt(&self) -> bool {
        !self.debt.is_zero()
    }

    /// Copy of this vault with `amount` of collateral removed
    pub fn without_collateral(&self, amount: Amount) -> Result<Vault, LedgerError> {
        let collateral =
            self.collateral
                .checked_sub(&amount)
                .ok_or(LedgerError::InsufficientCollateral {
                    available: self.collateral,
                    requested: amount,
                })?;
        Ok(Vault { collateral, ..*self })
    }

    /// Copy of this vault with `amount` more debt
    pub fn with_additional_debt(&self, amount: Amount) -> Result<Vault, LedgerError> {
        let debt = self
            .debt
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow("vault debt"))?;
        Ok(Vault {
            debt,
            closed: false,
            ..*self
        })
    }
}

/// All vaults, keyed by borrower address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStore {
    vaults: BTreeMap<Address, Vault>,
}

impl VaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current vault for `user` (zeroed if the user never touched the bank)
    pub fn get(&self, user: &Address) -> Vault {
        self.vaults.get(user).copied().unwrap_or_default()
    }

    /// Mutable vault for `user`, created zeroed on first touch
    pub fn get_or_create(&mut self, user: &Address) -> &mut Vault {
        self.vaults.entry(user.clone()).or_default()
    }

    /// Replace the vault for `user`
    pub fn put(&mut self, user: &Address, vault: Vault) {
        self.vaults.insert(user.clone(), vault);
    }

    pub fn collateral(&self, user: &Address) -> Amount {
        self.get(user).collateral
    }

    pub fn debt(&self, user: &Address) -> Amount {
        self.get(user).debt
    }

    /// Add collateral and reopen the vault; returns the new collateral balance
    pub fn deposit(&mut self, user: &Address, amount: Amount) -> Result<Amount, LedgerError> {
        let vault = self.get_or_create(user);
        vault.collateral = vault
            .collateral
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow("vault collateral"))?;
        vault.closed = false;
        Ok(vault.collateral)
    }

    /// Remove collateral; returns the new collateral balance
    pub fn withdraw(&mut self, user: &Address, amount: Amount) -> Result<Amount, LedgerError> {
        let updated = self.get(user).without_collateral(amount)?;
        self.put(user, updated);
        Ok(updated.collateral)
    }

    /// Overwrite the recorded debt
    pub fn set_debt(&mut self, user: &Address, amount: Amount) {
        self.get_or_create(user).debt = amount;
    }

    /// Write the debt off and mark the vault closed; returns the debt cleared
    pub fn close(&mut self, user: &Address) -> Amount {
        let cleared = self.debt(user);
        self.set_debt(user, Amount::ZERO);
        self.get_or_create(user).closed = true;
        cleared
    }

    /// Reduce the recorded debt by a repayment
    pub fn repay(&mut self, user: &Address, repayment: Amount) -> Result<Amount, LedgerError> {
        let vault = self.get_or_create(user);
        vault.debt = vault
            .debt
            .checked_sub(&repayment)
            .ok_or(LedgerError::RepaymentExceedsDebt {
                debt: vault.debt,
                repayment,
            })?;
        Ok(vault.debt)
    }

    /// Iterate over every known vault
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Vault)> {
        self.vaults.iter()
    }

    /// Addresses of vaults that currently carry debt
    pub fn borrowers(&self) -> Vec<Address> {
        self.vaults
            .iter()
            .filter(|(_, vault)| vault.has_debt())
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Number of known vaults
    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::new("alice").unwrap()
    }

    #[test]
    fn test_unknown_user_reads_zero() {
        let store = VaultStore::new();
        assert_eq!(store.get(&alice()), Vault::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_or_create_registers_vault() {
        let mut store = VaultStore::new();
        store.get_or_create(&alice());
        assert_eq!(store.len(), 1);
        assert_eq!(store.collateral(&alice()), Amount::ZERO);
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut store = VaultStore::new();
        assert_eq!(store.deposit(&alice(), Amount::new(500)), Ok(Amount::new(500)));
        assert_eq!(store.withdraw(&alice(), Amount::new(200)), Ok(Amount::new(300)));

        let result = store.withdraw(&alice(), Amount::new(301));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientCollateral {
                available: Amount::new(300),
                requested: Amount::new(301),
            })
        );
        assert_eq!(store.collateral(&alice()), Amount::new(300));
    }

    #[test]
    fn test_repay_cannot_go_below_zero() {
        let mut store = VaultStore::new();
        store.set_debt(&alice(), Amount::new(100));

        assert_eq!(store.repay(&alice(), Amount::new(40)), Ok(Amount::new(60)));
        assert!(matches!(
            store.repay(&alice(), Amount::new(61)),
            Err(LedgerError::RepaymentExceedsDebt { .. })
        ));
        assert_eq!(store.debt(&alice()), Amount::new(60));
    }

    #[test]
    fn test_borrowers_lists_only_indebted() {
        let mut store = VaultStore::new();
        let bob = Address::new("bob").unwrap();
        store.deposit(&alice(), Amount::new(10)).unwrap();
        store.set_debt(&bob, Amount::new(5));

        assert_eq!(store.borrowers(), vec![bob]);
    }

    #[test]
    fn test_close_writes_off_debt() {
        let mut store = VaultStore::new();
        store.deposit(&alice(), Amount::new(50)).unwrap();
        store.set_debt(&alice(), Amount::new(20));

        assert_eq!(store.close(&alice()), Amount::new(20));
        let vault = store.get(&alice());
        assert!(vault.closed);
        assert!(!vault.has_debt());
        assert_eq!(vault.collateral, Amount::new(50));
        assert!(store.borrowers().is_empty());
    }

    #[test]
    fn test_deposit_reopens_closed_vault() {
        let mut store = VaultStore::new();
        store.deposit(&alice(), Amount::new(50)).unwrap();
        store.close(&alice());

        store.deposit(&alice(), Amount::new(1)).unwrap();
        assert!(!store.get(&alice()).closed);
    }

    #[test]
    fn test_additional_debt_reopens_closed_vault() {
        let vault = Vault {
            collateral: Amount::new(10),
            debt: Amount::ZERO,
            closed: true,
        };
        let updated = vault.with_additional_debt(Amount::new(3)).unwrap();
        assert!(!updated.closed);
        assert_eq!(updated.debt, Amount::new(3));
    }
}
