//! JSONL event reader - sequential reader for reconciliation

use crate::error::EventError;
use crate::event::EventRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads every journal file in date order
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Reader over a journal directory (empty if it does not exist)
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if file_path.extension().is_some_and(|ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();

        Ok(Self { files })
    }

    /// Read all records from all files in order
    pub fn read_all(&self) -> Result<Vec<EventRecord>, EventError> {
        let mut records = Vec::new();

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);

            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: EventRecord =
                    serde_json::from_str(&line).map_err(|_| EventError::InvalidFile {
                        file: file_path.display().to_string(),
                        line: index + 1,
                    })?;
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Reconciliation faults awaiting offline review
    pub fn faults(&self) -> Result<Vec<EventRecord>, EventError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|record| record.event.is_fault())
            .collect())
    }

    /// Highest sequence number journaled so far
    pub fn last_sequence(&self) -> Result<Option<u64>, EventError> {
        Ok(self.read_all()?.last().map(|record| record.sequence))
    }

    /// Count total records across all files
    pub fn count(&self) -> Result<usize, EventError> {
        let mut count = 0;

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::BankEvent;
    use crate::store::EventStore;
    use flowbank_core::{Address, Amount};
    use uuid::Uuid;

    fn alice() -> Address {
        Address::new("alice").unwrap()
    }

    #[test]
    fn test_missing_directory_reads_empty() -> anyhow::Result<()> {
        let reader = EventReader::from_directory("/definitely/not/a/journal")?;
        assert!(reader.read_all()?.is_empty());
        assert_eq!(reader.last_sequence()?, None);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let correlation_id = Uuid::new_v4();

        let records = vec![
            EventRecord::new(
                1,
                correlation_id,
                BankEvent::VaultDeposited {
                    user: alice(),
                    amount: Amount::new(5_000_000_000_000_000_000_000),
                    collateral: Amount::new(5_000_000_000_000_000_000_000),
                },
            ),
            EventRecord::new(
                2,
                Uuid::new_v4(),
                BankEvent::ReconciliationFault {
                    user: alice(),
                    stage: "default closure".to_string(),
                    error: "collateral price not configured".to_string(),
                },
            ),
        ];

        {
            let mut store = EventStore::new(dir.path())?;
            store.append_batch(&records)?;
        }

        let reader = EventReader::from_directory(dir.path())?;
        assert_eq!(reader.read_all()?, records);
        assert_eq!(reader.count()?, 2);
        assert_eq!(reader.last_sequence()?, Some(2));

        let faults = reader.faults()?;
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].sequence, 2);
        Ok(())
    }

    #[test]
    fn test_corrupt_line_is_located() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("2026-01-01.jsonl"), "\n{not json}\n")?;

        let reader = EventReader::from_directory(dir.path())?;
        match reader.read_all() {
            Err(EventError::InvalidFile { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected invalid file, got {other:?}"),
        }
        Ok(())
    }
}
