//! Error types for the worker

use thiserror::Error;

/// Result type for worker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Worker errors
#[derive(Error, Debug)]
pub enum Error {
    /// Account not held by this partition (or the store could not be read)
    #[error("Account not found on this partition: {0}")]
    AccountNotFound(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Storage failure with context
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Debit committed but the audit record could not be appended.
    /// The balance has been reduced and no log entry exists; this is a genuine
    /// inconsistency that requires out-of-band reconciliation.
    #[error(
        "Debit of {amount} from account {account} committed but not recorded: {cause}"
    )]
    DebitNotRecorded {
        /// Source account whose balance was already reduced
        account: String,
        /// Debited amount, two fraction digits
        amount: String,
        /// Underlying append failure
        cause: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
