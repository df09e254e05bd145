//! FlowBank - Stream-rate lending bank
//!
//! A borrower streams interest to the bank continuously; the stream's rate
//! *is* the loan. `Bank` ties together:
//! - the ledger (vaults, reserve, prices) from `flowbank-ledger`
//! - the collateralization guard and liquidation engine from `flowbank-risk`
//! - the role registry from `flowbank-access`
//! - token and stream collaborators from `flowbank-host`
//! - the price oracle from `flowbank-oracle`
//!
//! Each public operation is one atomic step: it either commits completely,
//! external transfers included, or leaves no trace.

mod admin;
pub mod bank;
pub mod error;
mod liquidation;
mod reserve;
pub mod simulator;
mod streams;
mod vault;

pub use bank::Bank;
pub use error::BankError;
pub use liquidation::SweepReport;
pub use simulator::{parse_script, Command, Outcome, SimulatedBank, Simulation};
pub use streams::StreamClosure;
