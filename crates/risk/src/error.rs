//! Risk errors

use flowbank_core::Address;
use flowbank_ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Vault {0} is not undercollateralized")]
    NotUndercollateralized(Address),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
