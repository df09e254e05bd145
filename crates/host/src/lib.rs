//! FlowBank Host - External collaborators
//!
//! The bank does not move tokens or run payment streams itself. It talks to:
//! - a `TokenService` for pull (`transfer_from`) and push (`transfer`) transfers
//! - a `StreamHost` that owns every live payment stream and delivers
//!   `StreamNotification`s about them
//!
//! Both implement `Transactional`, so a failing bank operation can discard
//! transfers it already made within the same step.
//!
//! `InMemoryTokenLedger` and `InMemoryStreamHost` are complete implementations
//! used by tests and the simulator.

pub mod error;
pub mod memory;
pub mod notification;
pub mod traits;

pub use error::{StreamError, TokenError};
pub use memory::{InMemoryStreamHost, InMemoryTokenLedger};
pub use notification::{Delivery, StreamNotification};
pub use traits::{StreamHost, TokenService, Transactional};
