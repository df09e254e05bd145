//! Owner-only reserve movements

use flowbank_access::Role;
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
    /// Add lendable liquidity, pulled from the admin
    pub fn reserve_deposit(&mut self, caller: &Address, amount: Amount) -> Result<Amount, BankError> {
        self.atomically("reserve_deposit", |bank| {
            bank.roles.authorize(caller, Role::Admin)?;

            let token = bank.token(AssetRole::Debt)?;
            let reserve_balance = bank.state.reserve.credit(amount)?;
            bank.tokens
                .transfer_from(&token, &bank.address, caller, &bank.address, amount)?;

            bank.stage(BankEvent::ReserveDeposited {
                amount,
                reserve_balance,
            });
            Ok(reserve_balance)
        })
    }

    /// Take liquidity back out; never more than is uncommitted
    pub fn reserve_withdraw(&mut self, caller: &Address, amount: Amount) -> Result<Amount, BankError> {
        self.atomically("reserve_withdraw", |bank| {
            bank.roles.authorize(caller, Role::Admin)?;

            let token = bank.token(AssetRole::Debt)?;
            let reserve_balance = bank.state.reserve.debit(amount)?;
            bank.tokens.transfer(&token, &bank.address, caller, amount)?;

            bank.stage(BankEvent::ReserveWithdrawn {
                amount,
                reserve_balance,
            });
            Ok(reserve_balance)
        })
    }

    /// Withdraw collateral seized by liquidations
    pub fn reserve_collateral_withdraw(
        &mut self,
        caller: &Address,
        amount: Amount,
    ) -> Result<Amount, BankError> {
        self.atomically("reserve_collateral_withdraw", |bank| {
            bank.roles.authorize(caller, Role::Admin)?;

            let token = bank.token(AssetRole::Collateral)?;
            let reserve_collateral_balance = bank.state.reserve.debit_collateral(amount)?;
            bank.tokens.transfer(&token, &bank.address, caller, amount)?;

            bank.stage(BankEvent::ReserveCollateralWithdrawn {
                amount,
                reserve_collateral_balance,
            });
            Ok(reserve_collateral_balance)
        })
    }
}
