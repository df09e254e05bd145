//! Ledger errors

use flowbank_core::{Amount, RateError};
use thiserror::Error;

use crate::price::AssetRole;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient collateral: available {available}, requested {requested}")]
    InsufficientCollateral { available: Amount, requested: Amount },

    #[error("Insufficient reserves: available {available}, required {required}")]
    InsufficientReserves { available: Amount, required: Amount },

    #[error("Insufficient reserve collateral: available {available}, requested {requested}")]
    InsufficientReserveCollateral { available: Amount, requested: Amount },

    #[error("Repayment {repayment} exceeds recorded debt {debt}")]
    RepaymentExceedsDebt { debt: Amount, repayment: Amount },

    #[error("{0} asset is not configured")]
    AssetNotConfigured(AssetRole),

    #[error("Granularity must be positive")]
    InvalidGranularity,

    #[error("Invalid {role} price: {reason}")]
    InvalidPrice { role: AssetRole, reason: String },

    #[error("Stale {role} price: reported at {reported}, cached at {cached}")]
    StalePrice {
        role: AssetRole,
        reported: String,
        cached: String,
    },

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Rate conversion failed: {0}")]
    Rate(#[from] RateError),
}
