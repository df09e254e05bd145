//! Access control errors

use flowbank_core::Address;
use thiserror::Error;

use crate::registry::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("{caller} is not authorized as {role}")]
    Unauthorized { caller: Address, role: Role },

    #[error("{account} already holds the {held} role and cannot also be {requested}")]
    RoleConflict {
        account: Address,
        held: Role,
        requested: Role,
    },

    #[error("The admin role moves only through ownership transfer")]
    AdminNotGrantable,
}
