//! FlowBank Risk - Collateralization guard and liquidation engine
//!
//! Both components are pure evaluators over a `LedgerState`. The guard answers
//! "would this vault be healthy?"; the engine turns an unhealthy (or
//! defaulted) vault into a `LiquidationPlan` and applies it to a state the
//! caller owns. Neither performs external transfers.

pub mod error;
pub mod guard;
pub mod liquidation;

pub use error::RiskError;
pub use guard::CollateralGuard;
pub use liquidation::{LiquidationEngine, LiquidationPlan, LiquidationTrigger, VaultStatus};
