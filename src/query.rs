//! Read-only query operations over the partition

use crate::{error::Result, store::LedgerStore, types::AccountId};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Read-only view of the partition: balances and the cash position
pub struct QueryService {
    store: Arc<LedgerStore>,
}

impl QueryService {
    /// Build a query service over the partition's store
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Balance of one account; not-found is a normal, reportable outcome
    pub fn balance_of(&self, account_id: &AccountId) -> Result<Decimal> {
        self.store.balance_of(account_id)
    }

    /// Sum of every balance this partition holds
    pub fn partition_cash_position(&self) -> Result<Decimal> {
        self.store.sum_balances()
    }
}
