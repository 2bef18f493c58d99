//! Transfer engine: the origin-leg state machine
//!
//! One transfer request moves through
//! validate → debit → record. The engine composes the Ledger Store and the
//! Transaction Log into one logical, best-effort unit; it does not credit
//! the destination account, which belongs to whichever worker owns that
//! partition, coordinated by the external router.
//!
//! Contract: an `Ok` receipt means exactly one audit record was appended
//! (`Confirmed` or `RejectedInsufficientFunds`). An `Err` means none was —
//! with one documented exception, [`Error::DebitNotRecorded`], where the
//! debit committed but the append failed. That inconsistency is surfaced,
//! never auto-compensated.

use crate::{
    error::{Error, Result},
    store::{Debit, LedgerStore},
    txlog::TransactionLog,
    types::{format_amount, AccountId, TransferReceipt, TransferRequest, TransferStatus},
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Executes the origin-side leg of funds transfers
pub struct TransferEngine {
    store: Arc<LedgerStore>,
    log: Arc<TransactionLog>,
}

impl TransferEngine {
    /// Build an engine over the partition's store and log
    pub fn new(store: Arc<LedgerStore>, log: Arc<TransactionLog>) -> Self {
        Self { store, log }
    }

    /// Run one transfer request to its terminal state.
    pub fn execute(&self, request: &TransferRequest) -> Result<TransferReceipt> {
        self.validate(request)?;

        let timestamp = match &request.timestamp {
            Some(ts) => ts.clone(),
            None => Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        match self.store.debit(&request.source_account, request.amount)? {
            Debit::InsufficientFunds { balance } => {
                let record = self.log.append(
                    &request.source_account,
                    &request.dest_account,
                    request.amount,
                    TransferStatus::RejectedInsufficientFunds,
                    &timestamp,
                )?;
                tracing::info!(
                    transaction_id = record.transaction_id,
                    source = %request.source_account,
                    amount = %format_amount(request.amount),
                    balance = %format_amount(balance),
                    "Transfer rejected: insufficient funds"
                );
                Ok(self.receipt(record.transaction_id, request, None, timestamp))
            }
            Debit::Applied { new_balance } => {
                let record = self
                    .log
                    .append(
                        &request.source_account,
                        &request.dest_account,
                        request.amount,
                        TransferStatus::Confirmed,
                        &timestamp,
                    )
                    .map_err(|e| Error::DebitNotRecorded {
                        account: request.source_account.to_string(),
                        amount: format_amount(request.amount),
                        cause: e.to_string(),
                    })?;
                tracing::info!(
                    transaction_id = record.transaction_id,
                    source = %request.source_account,
                    dest = %request.dest_account,
                    amount = %format_amount(request.amount),
                    "Transfer origin leg confirmed"
                );
                Ok(self.receipt(
                    record.transaction_id,
                    request,
                    Some(new_balance),
                    timestamp,
                ))
            }
        }
    }

    fn receipt(
        &self,
        transaction_id: u64,
        request: &TransferRequest,
        new_balance: Option<Decimal>,
        timestamp: String,
    ) -> TransferReceipt {
        let status = if new_balance.is_some() {
            TransferStatus::Confirmed
        } else {
            TransferStatus::RejectedInsufficientFunds
        };
        TransferReceipt {
            transaction_id,
            status,
            source_account: request.source_account.clone(),
            dest_account: request.dest_account.clone(),
            amount: crate::types::normalize_amount(request.amount),
            new_balance: new_balance.map(crate::types::normalize_amount),
            timestamp,
        }
    }

    fn validate(&self, request: &TransferRequest) -> Result<()> {
        if !request.source_account.is_well_formed() {
            return Err(Error::Validation(
                "source_account is missing or not storable".to_string(),
            ));
        }
        if !request.dest_account.is_well_formed() {
            return Err(Error::Validation(
                "dest_account is missing or not storable".to_string(),
            ));
        }
        if request.amount <= Decimal::ZERO {
            return Err(Error::Validation("amount must be positive".to_string()));
        }
        if request.amount.round_dp(2) != request.amount {
            return Err(Error::Validation(
                "amount must have at most two fraction digits".to_string(),
            ));
        }
        if let Some(ts) = &request.timestamp {
            if ts.contains('|') || ts.chars().any(|c| c.is_control()) {
                return Err(Error::Validation("timestamp is not storable".to_string()));
            }
        }
        Ok(())
    }
}
