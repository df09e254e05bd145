//! FlowBank Events - What the bank did
//!
//! Every committed operation emits `BankEvent`s wrapped in an `EventRecord`.
//! Records can be journaled to append-only JSONL files (one per UTC day) and
//! read back for offline reconciliation.

pub mod error;
pub mod event;
pub mod reader;
pub mod store;

pub use error::EventError;
pub use event::{BankEvent, EventRecord};
pub use reader::EventReader;
pub use store::EventStore;
