//! Prometheus metrics for the worker

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_with_registry, register_histogram_with_registry, Counter, Encoder, Histogram,
    HistogramOpts, Opts, Registry, TextEncoder,
};

/// Global metrics handle
pub static METRICS: Lazy<Metrics> =
    Lazy::new(|| Metrics::new().expect("metrics registry initialization"));

/// Registry plus every counter the worker exports
pub struct Metrics {
    /// Owning registry, gathered on export
    pub registry: Registry,

    /// Balance lookups served
    pub balance_queries_total: Counter,
    /// Cash-position computations served
    pub cash_position_queries_total: Counter,

    /// Transfer requests received
    pub transfers_total: Counter,
    /// Origin legs confirmed
    pub transfers_confirmed_total: Counter,
    /// Rejections for insufficient funds
    pub transfers_rejected_insufficient_funds_total: Counter,
    /// Rejections because the source account is on another partition
    pub transfers_rejected_not_on_partition_total: Counter,
    /// Storage failures before the debit committed
    pub transfer_storage_failures_total: Counter,
    /// Debits committed whose audit append failed
    pub transfer_inconsistencies_total: Counter,

    /// End-to-end transfer execution time
    pub transfer_duration_seconds: Histogram,
}

impl Metrics {
    /// Build a fresh registry with every metric registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let balance_queries_total = register_counter_with_registry!(
            Opts::new("worker_balance_queries_total", "Balance lookups served"),
            registry
        )?;

        let cash_position_queries_total = register_counter_with_registry!(
            Opts::new(
                "worker_cash_position_queries_total",
                "Cash-position computations served"
            ),
            registry
        )?;

        let transfers_total = register_counter_with_registry!(
            Opts::new("worker_transfers_total", "Transfer requests received"),
            registry
        )?;

        let transfers_confirmed_total = register_counter_with_registry!(
            Opts::new(
                "worker_transfers_confirmed_total",
                "Transfer origin legs confirmed"
            ),
            registry
        )?;

        let transfers_rejected_insufficient_funds_total = register_counter_with_registry!(
            Opts::new(
                "worker_transfers_rejected_insufficient_funds_total",
                "Transfers rejected for insufficient funds"
            ),
            registry
        )?;

        let transfers_rejected_not_on_partition_total = register_counter_with_registry!(
            Opts::new(
                "worker_transfers_rejected_not_on_partition_total",
                "Transfers whose source account is not on this partition"
            ),
            registry
        )?;

        let transfer_storage_failures_total = register_counter_with_registry!(
            Opts::new(
                "worker_transfer_storage_failures_total",
                "Transfers failed on storage before the debit committed"
            ),
            registry
        )?;

        let transfer_inconsistencies_total = register_counter_with_registry!(
            Opts::new(
                "worker_transfer_inconsistencies_total",
                "Debits committed whose audit record could not be appended"
            ),
            registry
        )?;

        let transfer_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "worker_transfer_duration_seconds",
                "Transfer execution time in seconds"
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            registry
        )?;

        Ok(Self {
            registry,
            balance_queries_total,
            cash_position_queries_total,
            transfers_total,
            transfers_confirmed_total,
            transfers_rejected_insufficient_funds_total,
            transfers_rejected_not_on_partition_total,
            transfer_storage_failures_total,
            transfer_inconsistencies_total,
            transfer_duration_seconds,
        })
    }

    /// Text exposition of every registered metric
    pub fn export(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
