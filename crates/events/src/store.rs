//! Append-only journal of committed bank steps
//!
//! Each committed step hands over its records as one batch. The batch is
//! serialized in full before anything touches disk, then written and flushed
//! per day file, so a step is either journaled whole or not at all.

use crate::error::EventError;
use crate::event::EventRecord;
use crate::reader::EventReader;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes `YYYY-MM-DD.jsonl` files under one directory
pub struct EventStore {
    base_path: PathBuf,
    last_sequence: Option<u64>,
}

impl EventStore {
    /// Open (or create) a journal directory.
    ///
    /// An existing journal is resumed: new records must continue after the
    /// highest sequence already on disk.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, EventError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        let last_sequence = EventReader::from_directory(&base_path)?.last_sequence()?;

        if let Some(sequence) = last_sequence {
            debug!(path = %base_path.display(), sequence, "Resuming event journal");
        }
        Ok(Self {
            base_path,
            last_sequence,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Sequence number of the newest record in the journal
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Journal the records of one committed step.
    ///
    /// Sequence numbers must keep increasing across batches.
    pub fn append_batch(&mut self, records: &[EventRecord]) -> Result<(), EventError> {
        let mut previous = self.last_sequence;
        let mut days: BTreeMap<String, String> = BTreeMap::new();

        for record in records {
            if let Some(seq) = previous.filter(|seq| record.sequence <= *seq) {
                return Err(EventError::OutOfOrder {
                    previous: seq,
                    sequence: record.sequence,
                });
            }
            previous = Some(record.sequence);

            let line = serde_json::to_string(record)?;
            let day = days
                .entry(record.timestamp.format("%Y-%m-%d").to_string())
                .or_default();
            day.push_str(&line);
            day.push('\n');
        }

        for (date, lines) in &days {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.day_file(date))?;
            file.write_all(lines.as_bytes())?;
            file.flush()?;
        }

        if let Some(last) = records.last() {
            debug!(
                count = records.len(),
                sequence = last.sequence,
                "Journaled committed step"
            );
        }
        self.last_sequence = previous;
        Ok(())
    }

    fn day_file(&self, date: &str) -> PathBuf {
        self.base_path.join(format!("{date}.jsonl"))
    }
}
