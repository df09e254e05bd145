//! FlowBank Core - Domain types
//!
//! This crate contains the fundamental types used across FlowBank:
//! - `Address`: Type-safe account identifier
//! - `Amount`: Non-negative fixed-point token quantity
//! - `FlowRate`: Per-second payment stream rate
//! - `RateTranslator`: Payment rate <-> annual principal conversion

pub mod address;
pub mod amount;
pub mod rate;
mod serde_str;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError};
pub use rate::{FlowRate, PrincipalDelta, RateError, RateTranslator, BASIS_POINTS, SECONDS_PER_YEAR};
