//! Ledger store over a line-oriented record file
//!
//! One account record per line, pipe-delimited:
//! `account_id|owner_id|balance|account_type`, balances with exactly two
//! fraction digits, trailing newline per record.
//!
//! A single store-wide mutex serializes every operation. `debit` holds it
//! across the whole lookup-validate-rewrite sequence; two concurrent
//! transfers against the same account can never both observe the pre-debit
//! balance. Updates rewrite the full record set to a temp file and rename it
//! over the ledger, so a crash mid-update leaves the previous contents
//! intact. All other lines are carried over byte-identical.

use crate::{
    error::{Error, Result},
    types::{format_amount, AccountId, AccountRecord},
    Config,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// Outcome of a debit attempt that found the account
#[derive(Debug, Clone, PartialEq)]
pub enum Debit {
    /// Balance reduced and committed
    Applied {
        /// Source balance after the debit
        new_balance: Decimal,
    },
    /// Balance below the requested amount; store unchanged
    InsufficientFunds {
        /// The balance the amount was validated against
        balance: Decimal,
    },
}

/// Durable mapping from account id to balance and metadata
pub struct LedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LedgerStore {
    /// Open the store, creating the data directory if needed.
    ///
    /// The ledger file itself is not created: a missing file reads as an
    /// empty partition for point lookups and as unreadable for the sum.
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            path: config.ledger_path(),
            lock: Mutex::new(()),
        })
    }

    /// Write the given records only when the ledger file does not exist yet.
    /// Returns whether it seeded.
    pub fn seed_if_absent(&self, records: &[AccountRecord]) -> Result<bool> {
        let _guard = self.lock.lock();
        if self.path.exists() {
            return Ok(false);
        }
        let mut out = String::new();
        for record in records {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        let mut file = File::create(&self.path)?;
        file.write_all(out.as_bytes())?;
        file.sync_all()?;
        tracing::info!(
            path = %self.path.display(),
            accounts = records.len(),
            "Seeded ledger file"
        );
        Ok(true)
    }

    /// Look up the stored balance of one account.
    ///
    /// A missing record, a missing file, and an unreadable store all report
    /// as not-found: the account is not served by this partition either way.
    pub fn balance_of(&self, account_id: &AccountId) -> Result<Decimal> {
        let _guard = self.lock.lock();
        self.scan_balance(account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))
    }

    /// Debit `amount` from `account_id`: the full read-validate-rewrite
    /// sequence under one lock acquisition.
    pub fn debit(&self, account_id: &AccountId, amount: Decimal) -> Result<Debit> {
        let _guard = self.lock.lock();
        let balance = self
            .scan_balance(account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))?;

        if balance < amount {
            return Ok(Debit::InsufficientFunds { balance });
        }

        let new_balance = balance - amount;
        self.rewrite_balance(account_id, new_balance)?;
        tracing::debug!(
            account_id = %account_id,
            amount = %format_amount(amount),
            new_balance = %format_amount(new_balance),
            "Debit committed"
        );
        Ok(Debit::Applied { new_balance })
    }

    /// Point update of one balance, no funds validation. Provisioning path.
    pub fn set_balance(&self, account_id: &AccountId, new_balance: Decimal) -> Result<()> {
        let _guard = self.lock.lock();
        self.rewrite_balance(account_id, new_balance)
    }

    /// Sum every stored balance: the partition's cash position.
    ///
    /// Malformed lines are skipped with a warning; an unreadable file is a
    /// storage failure, not an empty partition.
    pub fn sum_balances(&self) -> Result<Decimal> {
        let _guard = self.lock.lock();
        let file = File::open(&self.path).map_err(|e| {
            Error::Storage(format!(
                "cannot read ledger file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut total = Decimal::ZERO;
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                Error::Storage(format!(
                    "cannot read ledger file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.trim().split('|').collect();
            match fields.get(2).and_then(|f| f.parse::<Decimal>().ok()) {
                Some(balance) => total += balance,
                None => {
                    tracing::warn!(line = idx + 1, "Skipping malformed ledger record");
                }
            }
        }
        Ok(total)
    }

    // Caller must hold the store lock.
    fn scan_balance(&self, account_id: &AccountId) -> Option<Decimal> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ledger file unreadable"
                );
                return None;
            }
        };

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(error = %e, "Ledger file unreadable mid-scan");
                    return None;
                }
            };
            let fields: Vec<&str> = line.trim().split('|').collect();
            if fields.first() != Some(&account_id.as_str()) {
                continue;
            }
            match fields.get(2).and_then(|f| f.parse::<Decimal>().ok()) {
                Some(balance) => return Some(balance),
                None => {
                    tracing::warn!(line = idx + 1, "Skipping malformed ledger record");
                    return None;
                }
            }
        }
        None
    }

    // Caller must hold the store lock.
    fn rewrite_balance(&self, account_id: &AccountId, new_balance: Decimal) -> Result<()> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Storage(format!(
                "cannot read ledger file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut out = String::with_capacity(contents.len());
        let mut updated = false;
        for line in contents.lines() {
            let fields: Vec<&str> = line.split('|').collect();
            if !updated && fields.len() >= 3 && fields[0] == account_id.as_str() {
                let rendered = format_amount(new_balance);
                let mut replaced = fields;
                replaced[2] = &rendered;
                out.push_str(&replaced.join("|"));
                updated = true;
            } else {
                out.push_str(line);
            }
            out.push('\n');
        }

        if !updated {
            return Err(Error::AccountNotFound(account_id.to_string()));
        }

        // Temp file in the same directory, then an atomic rename: a failure
        // at any point leaves the previous ledger contents in place.
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(out.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
