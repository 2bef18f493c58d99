//! Partition worker HTTP server binary

use anyhow::Context;
use ledger_worker::{
    server::{router, AppState},
    types::{AccountId, AccountRecord},
    Config, LedgerStore, QueryService, TransactionLog, TransferEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        ledger = %config.ledger_filename,
        txlog = %config.txlog_filename,
        "Starting ledger worker"
    );

    let store = Arc::new(LedgerStore::open(&config)?);
    if config.seed_dev_accounts && store.seed_if_absent(&dev_seed_accounts())? {
        tracing::info!("Seeded development ledger");
    }

    let log = Arc::new(TransactionLog::open(&config)?);
    tracing::info!(recorded = log.len(), "Transaction log opened");

    let state = AppState {
        engine: Arc::new(TransferEngine::new(store.clone(), log)),
        query: Arc::new(QueryService::new(store)),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("cannot bind port {}", config.port))?;
    tracing::info!("Worker listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn dev_seed_accounts() -> Vec<AccountRecord> {
    vec![
        AccountRecord {
            account_id: AccountId::new("1"),
            owner_id: "1".to_string(),
            balance: "1500.00".parse().expect("literal decimal"),
            account_type: "Ahorros".to_string(),
        },
        AccountRecord {
            account_id: AccountId::new("2"),
            owner_id: "2".to_string(),
            balance: "3200.50".parse().expect("literal decimal"),
            account_type: "Corriente".to_string(),
        },
        AccountRecord {
            account_id: AccountId::new("3"),
            owner_id: "1".to_string(),
            balance: "100.00".parse().expect("literal decimal"),
            account_type: "Ahorros".to_string(),
        },
    ]
}
