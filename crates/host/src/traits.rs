//! Collaborator traits

use flowbank_core::{Address, Amount, FlowRate};

use crate::error::{StreamError, TokenError};

/// Fungible token transfers
pub trait TokenService {
    /// Pull `amount` of `token` from `owner` to `recipient`, spending the
    /// allowance `owner` granted to `spender`
    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Push `amount` of `token` from `sender` to `recipient`
    fn transfer(
        &mut self,
        token: &Address,
        sender: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    fn balance_of(&self, token: &Address, account: &Address) -> Amount;

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount;
}

/// The payment-streaming protocol, seen from the bank
pub trait StreamHost {
    /// Live rate `sender` streams to the bank (zero if none)
    fn flow_rate(&self, sender: &Address) -> FlowRate;

    /// Forcibly stop the stream from `sender`; returns the rate it had
    fn terminate(&mut self, sender: &Address) -> Result<FlowRate, StreamError>;

    /// Set the bank's outbound revenue stream to `receiver` (zero deletes it)
    fn set_revenue_flow(&mut self, receiver: &Address, rate: FlowRate) -> Result<(), StreamError>;

    /// Current outbound revenue stream to `receiver`
    fn revenue_flow(&self, receiver: &Address) -> FlowRate;
}

/// Savepoint/rollback support for collaborators that take part in a bank step
pub trait Transactional {
    type Savepoint;

    fn savepoint(&self) -> Self::Savepoint;

    /// Discard everything done since `savepoint` was taken
    fn rollback(&mut self, savepoint: Self::Savepoint);
}
