//! Ledger state
//!
//! The complete set of recorded balances. It is cheap enough to clone that a
//! clone taken before an operation serves as that operation's rollback point.

use flowbank_core::FlowRate;
use serde::{Deserialize, Serialize};

use crate::price::PriceCache;
use crate::reserve::ReserveState;
use crate::vault::VaultStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub vaults: VaultStore,
    pub reserve: ReserveState,
    pub prices: PriceCache,
    /// Sum of all live borrower payment streams, forwarded to the owner
    pub revenue_rate: FlowRate,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }
}
