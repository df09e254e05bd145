//! In-memory collaborators
//!
//! Exact, deterministic stand-ins for a token contract and a streaming host.
//! Savepoints are full clones.

use flowbank_core::{Address, Amount, FlowRate};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{StreamError, TokenError};
use crate::traits::{StreamHost, TokenService, Transactional};

/// Balances and allowances for any number of tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTokenLedger {
    /// (token, account) -> balance
    balances: BTreeMap<(Address, Address), Amount>,
    /// (token, owner, spender) -> allowance
    allowances: BTreeMap<(Address, Address, Address), Amount>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `token` out of thin air for `account`
    pub fn mint(&mut self, token: &Address, account: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self
            .balance_of(token, account)
            .checked_add(&amount)
            .ok_or_else(|| TokenError::Overflow(account.clone()))?;
        self.balances
            .insert((token.clone(), account.clone()), balance);
        Ok(())
    }

    /// Let `spender` pull up to `amount` of `owner`'s `token`
    pub fn approve(&mut self, token: &Address, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .insert((token.clone(), owner.clone(), spender.clone()), amount);
    }

    fn move_balance(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let available = self.balance_of(token, from);
        let debited = available
            .checked_sub(&amount)
            .ok_or_else(|| TokenError::InsufficientBalance {
                token: token.clone(),
                account: from.clone(),
                available,
                requested: amount,
            })?;
        self.balances.insert((token.clone(), from.clone()), debited);

        let credited = self
            .balance_of(token, to)
            .checked_add(&amount)
            .ok_or_else(|| TokenError::Overflow(to.clone()))?;
        self.balances.insert((token.clone(), to.clone()), credited);
        Ok(())
    }
}

impl TokenService for InMemoryTokenLedger {
    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(token, owner, spender);
        let remaining = allowed
            .checked_sub(&amount)
            .ok_or_else(|| TokenError::InsufficientAllowance {
                token: token.clone(),
                owner: owner.clone(),
                spender: spender.clone(),
                allowed,
                requested: amount,
            })?;

        let before = self.clone();
        if let Err(e) = self.move_balance(token, owner, recipient, amount) {
            *self = before;
            return Err(e);
        }
        self.approve(token, owner, spender, remaining);

        debug!(token = %token, from = %owner, to = %recipient, amount = %amount, "Pulled tokens");
        Ok(())
    }

    fn transfer(
        &mut self,
        token: &Address,
        sender: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let before = self.clone();
        if let Err(e) = self.move_balance(token, sender, recipient, amount) {
            *self = before;
            return Err(e);
        }

        debug!(token = %token, from = %sender, to = %recipient, amount = %amount, "Pushed tokens");
        Ok(())
    }

    fn balance_of(&self, token: &Address, account: &Address) -> Amount {
        self.balances
            .get(&(token.clone(), account.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(token.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }
}

impl Transactional for InMemoryTokenLedger {
    type Savepoint = InMemoryTokenLedger;

    fn savepoint(&self) -> Self::Savepoint {
        self.clone()
    }

    fn rollback(&mut self, savepoint: Self::Savepoint) {
        *self = savepoint;
    }
}

/// Payment streams into one bank, plus the bank's outbound revenue streams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStreamHost {
    /// sender -> rate streamed to the bank
    inbound: BTreeMap<Address, FlowRate>,
    /// receiver -> rate the bank streams out
    revenue: BTreeMap<Address, FlowRate>,
}

impl InMemoryStreamHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inbound stream from `sender` (zero deletes it); returns the old rate
    pub fn set_flow(&mut self, sender: &Address, rate: FlowRate) -> FlowRate {
        let old = if rate.is_zero() {
            self.inbound.remove(sender)
        } else {
            self.inbound.insert(sender.clone(), rate)
        };
        old.unwrap_or_default()
    }

    /// Senders with a live stream to the bank
    pub fn senders(&self) -> Vec<Address> {
        self.inbound.keys().cloned().collect()
    }

    /// Sum of every inbound stream
    pub fn total_inflow(&self) -> FlowRate {
        self.inbound
            .values()
            .fold(FlowRate::ZERO, |acc, rate| {
                acc.checked_add(rate).unwrap_or(FlowRate::new(u128::MAX))
            })
    }
}

impl StreamHost for InMemoryStreamHost {
    fn flow_rate(&self, sender: &Address) -> FlowRate {
        self.inbound.get(sender).copied().unwrap_or_default()
    }

    fn terminate(&mut self, sender: &Address) -> Result<FlowRate, StreamError> {
        let rate = self
            .inbound
            .remove(sender)
            .ok_or_else(|| StreamError::NoStream(sender.clone()))?;
        debug!(sender = %sender, rate = %rate, "Stream terminated");
        Ok(rate)
    }

    fn set_revenue_flow(&mut self, receiver: &Address, rate: FlowRate) -> Result<(), StreamError> {
        if rate.is_zero() {
            self.revenue.remove(receiver);
        } else {
            self.revenue.insert(receiver.clone(), rate);
        }
        Ok(())
    }

    fn revenue_flow(&self, receiver: &Address) -> FlowRate {
        self.revenue.get(receiver).copied().unwrap_or_default()
    }
}

impl Transactional for InMemoryStreamHost {
    type Savepoint = InMemoryStreamHost;

    fn savepoint(&self) -> Self::Savepoint {
        self.clone()
    }

    fn rollback(&mut self, savepoint: Self::Savepoint) {
        *self = savepoint;
    }
}
