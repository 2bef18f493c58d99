//! Core types for the partition worker
//!
//! All monetary quantities are `rust_decimal::Decimal` — exact arithmetic,
//! rendered with exactly two fraction digits at rest and on the wire.
//! Records carry their own line codec (`to_line` / `parse_line`) for the
//! pipe-delimited flat files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier, unique within one partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be stored in a pipe-delimited record: non-empty,
    /// no field separator, no line breaks or other control characters.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && !self.0.contains('|') && !self.0.chars().any(|c| c.is_control())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round to two fraction digits and pin the scale, so `1500` renders as
/// `1500.00` and `3200.5` as `3200.50`.
pub fn normalize_amount(amount: Decimal) -> Decimal {
    let mut normalized = amount.round_dp(2);
    normalized.rescale(2);
    normalized
}

/// Render an amount the way it is stored: exactly two fraction digits
pub fn format_amount(amount: Decimal) -> String {
    normalize_amount(amount).to_string()
}

/// One account record of the ledger file
///
/// On disk: `account_id|owner_id|balance|account_type`, one record per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique account identifier
    pub account_id: AccountId,

    /// Owning customer identifier
    pub owner_id: String,

    /// Current balance, two fraction digits at rest
    pub balance: Decimal,

    /// Account type label (opaque to this worker)
    pub account_type: String,
}

impl AccountRecord {
    /// Render as one ledger line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.account_id,
            self.owner_id,
            format_amount(self.balance),
            self.account_type
        )
    }
}

/// Terminal status of a transfer attempt, as recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Origin-side debit committed and recorded
    Confirmed,
    /// Source balance was below the requested amount; nothing debited
    RejectedInsufficientFunds,
}

impl TransferStatus {
    /// Status label used on disk and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Confirmed => "Confirmed",
            TransferStatus::RejectedInsufficientFunds => "RejectedInsufficientFunds",
        }
    }

    /// Parse from the on-disk label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Confirmed" => Some(TransferStatus::Confirmed),
            "RejectedInsufficientFunds" => Some(TransferStatus::RejectedInsufficientFunds),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transaction record of the audit trail
///
/// On disk: `transaction_id|source|dest|amount|timestamp|status`, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Strictly increasing, gap-free identifier starting at 1
    pub transaction_id: u64,

    /// Debited account (owned by this partition)
    pub source_account: AccountId,

    /// Credited account (owned by whichever partition the router says)
    pub dest_account: AccountId,

    /// Transfer amount, two fraction digits
    pub amount: Decimal,

    /// Timestamp as supplied by the router, or stamped at execution
    pub timestamp: String,

    /// Terminal outcome
    pub status: TransferStatus,
}

impl TransactionRecord {
    /// Render as one log line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.transaction_id,
            self.source_account,
            self.dest_account,
            format_amount(self.amount),
            self.timestamp,
            self.status
        )
    }

    /// Parse one log line; `None` for anything malformed
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim_end().split('|').collect();
        if fields.len() != 6 {
            return None;
        }
        Some(Self {
            transaction_id: fields[0].parse().ok()?,
            source_account: AccountId::new(fields[1]),
            dest_account: AccountId::new(fields[2]),
            amount: fields[3].parse().ok()?,
            timestamp: fields[4].to_string(),
            status: TransferStatus::parse(fields[5])?,
        })
    }
}

/// A transfer request as received from the router
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    /// Account to debit; must be owned by this partition
    pub source_account: AccountId,

    /// Account to credit; the credit itself is not performed here
    pub dest_account: AccountId,

    /// Amount to move, must be positive with at most two fraction digits
    pub amount: Decimal,

    /// Optional timestamp assigned by the router
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Outcome of a transfer request that produced an audit record
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    /// Identifier of the appended transaction record
    pub transaction_id: u64,

    /// `Confirmed` or `RejectedInsufficientFunds`
    pub status: TransferStatus,

    /// Debited account
    pub source_account: AccountId,

    /// Destination account, to be credited by its owning partition
    pub dest_account: AccountId,

    /// Transfer amount, two fraction digits
    pub amount: Decimal,

    /// Source balance after the debit; absent on a rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<Decimal>,

    /// Timestamp recorded in the audit trail
    pub timestamp: String,
}
