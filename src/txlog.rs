//! Append-only transaction log
//!
//! One transfer attempt per line, pipe-delimited:
//! `transaction_id|source|dest|amount|timestamp|status`. Records are never
//! mutated or removed.
//!
//! Identifiers come from a monotonic counter recovered by a single scan at
//! open and advanced under the log lock, which keeps them strictly
//! increasing and gap-free without re-counting the file on every append.

use crate::{
    error::{Error, Result},
    types::{AccountId, TransactionRecord, TransferStatus},
    Config,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

struct LogState {
    next_id: u64,
    len: u64,
}

/// Durable audit trail of transfer attempts
pub struct TransactionLog {
    path: PathBuf,
    state: Mutex<LogState>,
}

impl TransactionLog {
    /// Open the log, recovering the id counter from existing records.
    /// The file is created lazily on first append.
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let path = config.txlog_path();

        let mut max_id = 0u64;
        let mut len = 0u64;
        if path.exists() {
            let file = File::open(&path)?;
            for (idx, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match TransactionRecord::parse_line(&line) {
                    Some(record) => {
                        max_id = max_id.max(record.transaction_id);
                        len += 1;
                    }
                    None => {
                        tracing::warn!(line = idx + 1, "Skipping malformed transaction record");
                    }
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            recovered = len,
            next_id = max_id + 1,
            "Transaction log opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(LogState {
                next_id: max_id + 1,
                len,
            }),
        })
    }

    /// Append one transfer attempt, assigning the next identifier.
    ///
    /// The counter advances only after the record is on disk; a failed append
    /// leaves the log and the id sequence unchanged.
    pub fn append(
        &self,
        source: &AccountId,
        dest: &AccountId,
        amount: Decimal,
        status: TransferStatus,
        timestamp: &str,
    ) -> Result<TransactionRecord> {
        let mut state = self.state.lock();
        let record = TransactionRecord {
            transaction_id: state.next_id,
            source_account: source.clone(),
            dest_account: dest.clone(),
            amount,
            timestamp: timestamp.to_string(),
            status,
        };

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| {
                Error::Storage(format!(
                    "cannot open transaction log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        file.write_all(format!("{}\n", record.to_line()).as_bytes())?;
        file.sync_all()?;

        state.next_id += 1;
        state.len += 1;
        tracing::debug!(
            transaction_id = record.transaction_id,
            status = %record.status,
            "Transaction recorded"
        );
        Ok(record)
    }

    /// Number of records recovered at open plus appended since
    pub fn len(&self) -> u64 {
        self.state.lock().len
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
