//! Event journal errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event {sequence} journaled after {previous}")]
    OutOfOrder { previous: u64, sequence: u64 },

    #[error("Invalid event file {file}: line {line}")]
    InvalidFile { file: String, line: usize },
}
