//! Collaborator errors

use flowbank_core::{Address, Amount};
use thiserror::Error;

/// A refused token transfer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient {token} balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        token: Address,
        account: Address,
        available: Amount,
        requested: Amount,
    },

    #[error("Insufficient {token} allowance from {owner} to {spender}: allowed {allowed}, requested {requested}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        allowed: Amount,
        requested: Amount,
    },

    #[error("Token balance overflow for {0}")]
    Overflow(Address),
}

/// A refused stream operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("No live stream from {0}")]
    NoStream(Address),

    #[error("Stream host rejected the operation: {0}")]
    Rejected(String),
}
