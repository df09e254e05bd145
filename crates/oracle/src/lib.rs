//! FlowBank Price Oracle
//!
//! The bank never polls: a reporter triggers an update, and the bank pulls a
//! single `Quote` through the `PriceOracle` trait. `MockOracle` serves fixed
//! quotes for tests and the simulator.

mod error;
mod mock;
mod types;

pub use error::OracleError;
pub use mock::MockOracle;
pub use types::{PriceOracle, Quote};
