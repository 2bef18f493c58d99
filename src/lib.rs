//! Partition worker for a sharded account ledger
//!
//! One worker node owns a partition of accounts, answers balance queries,
//! computes the partition-wide cash position, and executes the origin-side
//! leg of a funds transfer. Cross-partition orchestration (crediting a
//! destination account owned by another worker) belongs to the central
//! router and is out of scope here.
//!
//! # Architecture
//!
//! - **Ledger Store**: durable account records in a line-oriented flat file
//! - **Transaction Log**: append-only audit trail of transfer attempts
//! - **Transfer Engine**: validate, debit, record — one critical section per resource
//! - **Query Service**: read-only balance and cash-position lookups
//!
//! # Invariants
//!
//! - A debit never commits against a balance it was not validated against
//! - Every funds-validated transfer attempt appends exactly one audit record
//! - Transaction ids are strictly increasing and gap-free, starting at 1
//! - Single process: no cross-process locking exists for the data files

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod types;
pub mod store;
pub mod txlog;
pub mod engine;
pub mod query;
pub mod error;
pub mod config;
pub mod metrics;
pub mod server;

// Re-exports
pub use config::Config;
pub use engine::TransferEngine;
pub use error::{Error, Result};
pub use query::QueryService;
pub use store::{Debit, LedgerStore};
pub use txlog::TransactionLog;
pub use types::{
    AccountId, AccountRecord, TransactionRecord, TransferReceipt, TransferRequest, TransferStatus,
};
