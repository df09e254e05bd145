//! Bank events

use chrono::{DateTime, Utc};
use flowbank_access::Role;
use flowbank_core::{Address, Amount, FlowRate};
use flowbank_ledger::AssetRole;
use flowbank_risk::LiquidationTrigger;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BankEvent {
    VaultDeposited {
        user: Address,
        amount: Amount,
        collateral: Amount,
    },
    VaultWithdrawn {
        user: Address,
        amount: Amount,
        collateral: Amount,
    },
    /// Principal lent out because the borrower's stream went up
    Borrowed {
        user: Address,
        principal: Amount,
        debt: Amount,
        rate: FlowRate,
    },
    /// Principal paid back because the borrower's stream went down or stopped
    Repaid {
        user: Address,
        principal: Amount,
        debt: Amount,
        rate: FlowRate,
    },
    ReserveDeposited {
        amount: Amount,
        reserve_balance: Amount,
    },
    ReserveWithdrawn {
        amount: Amount,
        reserve_balance: Amount,
    },
    ReserveCollateralWithdrawn {
        amount: Amount,
        reserve_collateral_balance: Amount,
    },
    AssetConfigured {
        role: AssetRole,
        token: Address,
        symbol: String,
        granularity: u64,
        price: u64,
    },
    PriceUpdated {
        role: AssetRole,
        previous: u64,
        price: u64,
        reported_at: DateTime<Utc>,
    },
    Liquidated {
        user: Address,
        trigger: LiquidationTrigger,
        debt_cleared: Amount,
        collateral_seized: Amount,
    },
    RevenueFlowUpdated {
        receiver: Address,
        rate: FlowRate,
    },
    RoleGranted {
        role: Role,
        account: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
    },
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
    /// Bookkeeping inconsistency found while acknowledging a stream deletion.
    /// The deletion itself went through; this needs offline reconciliation.
    ReconciliationFault {
        user: Address,
        stage: String,
        error: String,
    },
}

impl BankEvent {
    /// Short snake_case name, e.g. `vault_deposited`
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Borrower the event is about, if any
    pub fn user(&self) -> Option<&Address> {
        match self {
            Self::VaultDeposited { user, .. }
            | Self::VaultWithdrawn { user, .. }
            | Self::Borrowed { user, .. }
            | Self::Repaid { user, .. }
            | Self::Liquidated { user, .. }
            | Self::ReconciliationFault { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::ReconciliationFault { .. })
    }
}

/// A committed event with its position in the bank's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing, starting at 1
    pub sequence: u64,
    /// Shared by every event of the same operation
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: BankEvent,
}

impl EventRecord {
    pub fn new(sequence: u64, correlation_id: Uuid, event: BankEvent) -> Self {
        Self {
            sequence,
            correlation_id,
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_and_user() {
        let event = BankEvent::Liquidated {
            user: Address::new("alice").unwrap(),
            trigger: LiquidationTrigger::StreamDefault,
            debt_cleared: Amount::new(1000),
            collateral_seized: Amount::new(1250),
        };
        assert_eq!(event.name(), "liquidated");
        assert_eq!(event.user().map(Address::as_str), Some("alice"));
        assert!(!event.is_fault());

        let event = BankEvent::ReserveDeposited {
            amount: Amount::new(1),
            reserve_balance: Amount::new(1),
        };
        assert_eq!(event.name(), "reserve_deposited");
        assert!(event.user().is_none());
    }

    #[test]
    fn test_record_json_is_tagged() {
        let record = EventRecord::new(
            7,
            Uuid::new_v4(),
            BankEvent::RoleGranted {
                role: Role::Keeper,
                account: Address::new("k1").unwrap(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["sequence"], 7);
        assert_eq!(json["event"]["type"], "role_granted");
        assert_eq!(json["event"]["role"], "keeper");

        let parsed: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
