//! Bank errors
//!
//! Every failure is an all-or-nothing rejection of one step. The first group
//! is the precondition taxonomy callers are expected to handle; the rest are
//! infrastructure failures.

use flowbank_access::{AccessError, Role};
use flowbank_core::{Address, Amount};
use flowbank_events::EventError;
use flowbank_host::{StreamError, TokenError};
use flowbank_ledger::{AssetRole, ConfigError, LedgerError};
use flowbank_oracle::OracleError;
use flowbank_risk::RiskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("{caller} is not authorized as {role}")]
    Unauthorized { caller: Address, role: Role },

    #[error("Insufficient reserves: available {available}, required {required}")]
    InsufficientReserves { available: Amount, required: Amount },

    #[error("Insufficient collateral: {0}")]
    InsufficientCollateral(String),

    #[error("Withdrawing {amount} would undercollateralize vault {user}")]
    WithdrawalWouldUndercollateralize { user: Address, amount: Amount },

    #[error("Repayment {repayment} exceeds recorded debt {debt}")]
    RepaymentExceedsDebt { debt: Amount, repayment: Amount },

    #[error("Vault {0} is not undercollateralized")]
    VaultNotUndercollateralized(Address),

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    #[error("Insufficient reserve collateral: available {available}, requested {requested}")]
    InsufficientReserveCollateral { available: Amount, requested: Amount },

    #[error("Stream host error: {0}")]
    Stream(#[from] StreamError),

    #[error("Oracle error: {0}")]
    Oracle(OracleError),

    #[error("{0} asset is not configured")]
    AssetNotConfigured(AssetRole),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Stale price: {0}")]
    StalePrice(String),

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Role change refused: {0}")]
    Access(AccessError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),
}

impl BankError {
    /// True for a refused external transfer
    pub fn is_transfer_failure(&self) -> bool {
        matches!(self, BankError::TransferFailed(_))
    }
}

impl From<LedgerError> for BankError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientCollateral { .. } => {
                BankError::InsufficientCollateral(err.to_string())
            }
            LedgerError::InsufficientReserves {
                available,
                required,
            } => BankError::InsufficientReserves {
                available,
                required,
            },
            LedgerError::InsufficientReserveCollateral {
                available,
                requested,
            } => BankError::InsufficientReserveCollateral {
                available,
                requested,
            },
            LedgerError::RepaymentExceedsDebt { debt, repayment } => {
                BankError::RepaymentExceedsDebt { debt, repayment }
            }
            LedgerError::AssetNotConfigured(role) => BankError::AssetNotConfigured(role),
            LedgerError::InvalidGranularity | LedgerError::InvalidPrice { .. } => {
                BankError::InvalidAsset(err.to_string())
            }
            LedgerError::StalePrice { .. } => BankError::StalePrice(err.to_string()),
            LedgerError::Overflow(_) | LedgerError::Rate(_) => {
                BankError::Arithmetic(err.to_string())
            }
        }
    }
}

impl From<RiskError> for BankError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::NotUndercollateralized(user) => BankError::VaultNotUndercollateralized(user),
            RiskError::Overflow(_) => BankError::Arithmetic(err.to_string()),
            RiskError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<AccessError> for BankError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthorized { caller, role } => BankError::Unauthorized { caller, role },
            other => BankError::Access(other),
        }
    }
}

impl From<OracleError> for BankError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::StalePrice { .. } => BankError::StalePrice(err.to_string()),
            other => BankError::Oracle(other),
        }
    }
}

impl From<flowbank_core::RateError> for BankError {
    fn from(err: flowbank_core::RateError) -> Self {
        BankError::Arithmetic(err.to_string())
    }
}
