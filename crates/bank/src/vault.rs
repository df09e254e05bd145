//! Collateral deposits and withdrawals

use flowbank_core::{Address, Amount};
use flowbank_events::BankEvent;
use flowbank_host::{StreamHost, TokenService, Transactional};
use flowbank_ledger::AssetRole;

use crate::bank::Bank;
use crate::error::BankError;

impl<T, S> Bank<T, S>
where
    T: TokenService + Transactional,
    S: StreamHost + Transactional,
{
    /// Pull `amount` of collateral from `user` into custody.
    ///
    /// Returns the vault's new collateral balance.
    pub fn vault_deposit(&mut self, user: &Address, amount: Amount) -> Result<Amount, BankError> {
        self.atomically("vault_deposit", |bank| {
            let token = bank.token(AssetRole::Collateral)?;
            let collateral = bank.state.vaults.deposit(user, amount)?;
            bank.tokens
                .transfer_from(&token, &bank.address, user, &bank.address, amount)?;

            bank.stage(BankEvent::VaultDeposited {
                user: user.clone(),
                amount,
                collateral,
            });
            Ok(collateral)
        })
    }

    /// Return `amount` of collateral to `user`.
    ///
    /// A vault with debt must still pass the guard afterward; otherwise the
    /// tentative withdrawal is rolled back.
    pub fn vault_withdraw(&mut self, user: &Address, amount: Amount) -> Result<Amount, BankError> {
        self.atomically("vault_withdraw", |bank| {
            let collateral = bank.state.vaults.withdraw(user, amount)?;

            let updated = bank.state.vaults.get(user);
            if updated.has_debt() && !bank.guard().is_healthy(&updated)? {
                return Err(BankError::WithdrawalWouldUndercollateralize {
                    user: user.clone(),
                    amount,
                });
            }

            let token = bank.token(AssetRole::Collateral)?;
            bank.tokens.transfer(&token, &bank.address, user, amount)?;

            bank.stage(BankEvent::VaultWithdrawn {
                user: user.clone(),
                amount,
                collateral,
            });
            Ok(collateral)
        })
    }
}
