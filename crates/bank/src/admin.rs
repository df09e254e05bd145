//! Asset configuration, price reports and role management

use chrono::Utc;
use flowbank_access::Role;
use flowbank_core::{Address, FlowRate};
use flowbank_events::BankEvent;
use flowbank_host::{StreamHost, TokenService, Transactional};
use flowbank_ledger::{AssetRole, PriceRecord};
use flowbank_oracle::PriceOracle;

use crate::bank::Bank;
use crate::error::BankError;

impl<T, S> Bank<T, S>
where
    T: TokenService + Transactional,
    S: StreamHost + Transactional,
{
    /// Configure the collateral asset and its initial price. Admin only.
    pub fn set_collateral(
        &mut self,
        caller: &Address,
        token: Address,
        symbol: &str,
        granularity: u64,
        price: u64,
    ) -> Result<(), BankError> {
        self.configure_asset(caller, AssetRole::Collateral, token, symbol, granularity, price)
    }

    /// Configure the debt asset and its initial price. Admin only.
    pub fn set_debt(
        &mut self,
        caller: &Address,
        token: Address,
        symbol: &str,
        granularity: u64,
        price: u64,
    ) -> Result<(), BankError> {
        self.configure_asset(caller, AssetRole::Debt, token, symbol, granularity, price)
    }

    fn configure_asset(
        &mut self,
        caller: &Address,
        role: AssetRole,
        token: Address,
        symbol: &str,
        granularity: u64,
        price: u64,
    ) -> Result<(), BankError> {
        self.atomically("configure_asset", |bank| {
            bank.roles.authorize(caller, Role::Admin)?;

            let record = PriceRecord::new(token.clone(), symbol, granularity, price)?;
            bank.state.prices.configure(role, record);

            bank.stage(BankEvent::AssetConfigured {
                role,
                token,
                symbol: symbol.to_string(),
                granularity,
                price,
            });
            Ok(())
        })
    }

    /// Pull a fresh collateral price from `oracle`. Reporter only.
    pub async fn update_collateral_price(
        &mut self,
        caller: &Address,
        oracle: &dyn PriceOracle,
    ) -> Result<u64, BankError> {
        self.update_price(caller, AssetRole::Collateral, oracle).await
    }

    /// Pull a fresh debt price from `oracle`. Reporter only.
    pub async fn update_debt_price(
        &mut self,
        caller: &Address,
        oracle: &dyn PriceOracle,
    ) -> Result<u64, BankError> {
        self.update_price(caller, AssetRole::Debt, oracle).await
    }

    /// Fetch one quote, then apply it as a single step.
    ///
    /// Quotes older than the cached report or than `max_price_age_secs` are
    /// refused. Returns the new price numerator.
    pub async fn update_price(
        &mut self,
        caller: &Address,
        role: AssetRole,
        oracle: &dyn PriceOracle,
    ) -> Result<u64, BankError> {
        self.roles.authorize(caller, Role::Reporter)?;
        let symbol = self.asset(role)?.symbol.clone();

        let quote = oracle.quote(&symbol).await?;
        quote.validate(self.config.max_price_age_secs, Utc::now())?;

        self.atomically("update_price", |bank| {
            let price = bank.state.prices.get(role)?.numerator_for(role, quote.value)?;
            let previous = bank.state.prices.update(role, price, quote.timestamp)?;

            bank.stage(BankEvent::PriceUpdated {
                role,
                previous,
                price,
                reported_at: quote.timestamp,
            });
            Ok(price)
        })
    }

    pub fn add_keeper(&mut self, caller: &Address, account: &Address) -> Result<bool, BankError> {
        self.grant_role(caller, Role::Keeper, account)
    }

    pub fn revoke_keeper(&mut self, caller: &Address, account: &Address) -> Result<bool, BankError> {
        self.revoke_role(caller, Role::Keeper, account)
    }

    pub fn add_reporter(&mut self, caller: &Address, account: &Address) -> Result<bool, BankError> {
        self.grant_role(caller, Role::Reporter, account)
    }

    pub fn revoke_reporter(&mut self, caller: &Address, account: &Address) -> Result<bool, BankError> {
        self.revoke_role(caller, Role::Reporter, account)
    }

    /// Grant a role. Admin only; returns false if already granted.
    pub fn grant_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<bool, BankError> {
        self.atomically("grant_role", |bank| {
            let granted = bank.roles.grant(caller, role, account)?;
            if granted {
                bank.stage(BankEvent::RoleGranted {
                    role,
                    account: account.clone(),
                });
            }
            Ok(granted)
        })
    }

    /// Revoke a role. Admin only; returns false if not held.
    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<bool, BankError> {
        self.atomically("revoke_role", |bank| {
            let revoked = bank.roles.revoke(caller, role, account)?;
            if revoked {
                bank.stage(BankEvent::RoleRevoked {
                    role,
                    account: account.clone(),
                });
            }
            Ok(revoked)
        })
    }

    /// Hand the admin role, and the revenue stream with it, to `new_owner`
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> Result<(), BankError> {
        self.atomically("transfer_ownership", |bank| {
            let transfer = bank.roles.transfer_ownership(caller, new_owner)?;

            let revenue = bank.state.revenue_rate;
            if !revenue.is_zero() && transfer.previous != transfer.new_owner {
                bank.streams
                    .set_revenue_flow(&transfer.previous, FlowRate::ZERO)?;
                bank.streams.set_revenue_flow(&transfer.new_owner, revenue)?;
                bank.stage(BankEvent::RevenueFlowUpdated {
                    receiver: transfer.new_owner.clone(),
                    rate: revenue,
                });
            }

            for role in &transfer.revoked {
                bank.stage(BankEvent::RoleRevoked {
                    role: *role,
                    account: transfer.new_owner.clone(),
                });
            }
            bank.stage(BankEvent::OwnershipTransferred {
                previous: transfer.previous,
                new_owner: transfer.new_owner,
            });
            Ok(())
        })
    }
}
