//! FlowBank Access Control
//!
//! Three disjoint capability sets:
//! - `Admin`: the single owner. Passes every role check, manages the other
//!   roles, and is the only account allowed to move the reserve.
//! - `Keeper`: operational triggers (liquidation sweeps).
//! - `Reporter`: price submission.
//!
//! Every operation starts with one `authorize(caller, role)` call and carries
//! the returned `Authorization` instead of re-checking membership ad hoc.

pub mod error;
pub mod registry;

pub use error::AccessError;
pub use registry::{Authorization, OwnershipTransfer, Role, RoleRegistry};
