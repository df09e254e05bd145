//! FlowBank Ledger - Accounting state
//!
//! All recorded balances live here. The crate holds no policy: whether a
//! mutation is *allowed* (collateralization, roles) is decided by the risk and
//! access crates before anything in this crate is touched.
//!
//! # Key Types
//! - `BankConfig`: Immutable bank parameters
//! - `VaultStore`: Per-borrower collateral and debt
//! - `ReserveState`: Lendable liquidity and seized collateral
//! - `PriceCache`: Last reported collateral and debt prices
//! - `LedgerState`: Everything above, cloneable as a transaction snapshot

pub mod config;
pub mod error;
pub mod price;
pub mod reserve;
pub mod state;
pub mod vault;

pub use config::{BankConfig, ConfigError};
pub use error::LedgerError;
pub use price::{AssetRole, PriceCache, PriceRecord};
pub use reserve::ReserveState;
pub use state::LedgerState;
pub use vault::{Vault, VaultStore};
