//! Stream lifecycle notifications
//!
//! Delivered by the streaming host, in order per sender, inside the step that
//! changes the stream. A `Rejected` delivery tells the host not to apply the
//! change. Deletions cannot be rejected.

use flowbank_core::{Address, FlowRate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamNotification {
    Opened {
        sender: Address,
        rate: FlowRate,
    },
    Updated {
        sender: Address,
        old_rate: FlowRate,
        new_rate: FlowRate,
    },
    Deleted {
        sender: Address,
        old_rate: FlowRate,
    },
}

impl StreamNotification {
    pub fn sender(&self) -> &Address {
        match self {
            Self::Opened { sender, .. }
            | Self::Updated { sender, .. }
            | Self::Deleted { sender, .. } => sender,
        }
    }
}

/// The bank's answer to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    /// Change accepted and booked
    Accepted,
    /// Change refused; the host must not apply it
    Rejected { reason: String },
    /// Deletion acknowledged
    Acknowledged {
        /// True when the borrower defaulted and the vault was closed
        defaulted: bool,
    },
}

impl Delivery {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_json_shape() {
        let notification = StreamNotification::Updated {
            sender: Address::new("alice").unwrap(),
            old_rate: FlowRate::new(10),
            new_rate: FlowRate::new(20),
        };
        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["kind"], "updated");
        assert_eq!(json["sender"], "alice");
        assert_eq!(json["new_rate"], "20");
        assert_eq!(notification.sender().as_str(), "alice");
    }

    #[test]
    fn test_delivery_rejection() {
        assert!(Delivery::Rejected {
            reason: "no".to_string()
        }
        .is_rejected());
        assert!(!Delivery::Acknowledged { defaulted: true }.is_rejected());
    }
}
