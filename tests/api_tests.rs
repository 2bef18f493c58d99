//! Endpoint contract tests, driven through the router

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ledger_worker::{
    server::{router, AppState},
    types::{AccountId, AccountRecord},
    Config, LedgerStore, QueryService, TransactionLog, TransferEngine,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn account(id: &str, owner: &str, balance: &str, kind: &str) -> AccountRecord {
    AccountRecord {
        account_id: AccountId::new(id),
        owner_id: owner.to_string(),
        balance: balance.parse().unwrap(),
        account_type: kind.to_string(),
    }
}

fn app_with(records: &[AccountRecord]) -> (Router, Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();

    let store = Arc::new(LedgerStore::open(&config).unwrap());
    store.seed_if_absent(records).unwrap();
    let log = Arc::new(TransactionLog::open(&config).unwrap());

    let state = AppState {
        engine: Arc::new(TransferEngine::new(store.clone(), log)),
        query: Arc::new(QueryService::new(store)),
    };
    (router(state), config, temp_dir)
}

fn classic_app() -> (Router, Config, TempDir) {
    app_with(&[
        account("1", "1", "1500.00", "Ahorros"),
        account("2", "2", "3200.50", "Corriente"),
        account("3", "1", "100.00", "Ahorros"),
    ])
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post_transfer(app: &Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transfer")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_is_always_ok() {
    let (app, _config, _temp) = classic_app();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ledger-worker");
}

#[tokio::test]
async fn balance_returns_two_digit_rendering() {
    let (app, _config, _temp) = classic_app();
    let (status, body) = get(&app, "/balance?account_id=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_id"], "1");
    assert_eq!(body["balance"], "1500.00");
}

#[tokio::test]
async fn balance_requires_account_id() {
    let (app, _config, _temp) = classic_app();

    let (status, body) = get(&app, "/balance").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("account_id"));

    let (status, _) = get(&app, "/balance?account_id=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn balance_of_foreign_account_is_not_found() {
    let (app, _config, _temp) = classic_app();
    let (status, body) = get(&app, "/balance?account_id=999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn cash_position_sums_the_partition() {
    let (app, _config, _temp) = app_with(&[
        account("1", "1", "1500.00", "Ahorros"),
        account("2", "2", "3200.50", "Corriente"),
    ]);
    let (status, body) = get(&app, "/cash_position").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partition_total"], "4700.50");
}

#[tokio::test]
async fn confirmed_transfer_debits_and_records() {
    let (app, config, _temp) = classic_app();

    let (status, body) = post_transfer(
        &app,
        r#"{"source_account":"1","dest_account":"2","amount":500}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Confirmed");
    assert_eq!(body["transaction_id"], 1);
    assert_eq!(body["new_balance"], "1000.00");

    let (_, balance) = get(&app, "/balance?account_id=1").await;
    assert_eq!(balance["balance"], "1000.00");

    let log = std::fs::read_to_string(config.txlog_path()).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.starts_with("1|1|2|500.00|"));
    assert!(log.trim_end().ends_with("|Confirmed"));
}

#[tokio::test]
async fn insufficient_funds_is_rejected_and_recorded() {
    let (app, config, _temp) = classic_app();

    let (status, body) = post_transfer(
        &app,
        r#"{"source_account":"3","dest_account":"2","amount":500}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "RejectedInsufficientFunds");
    assert_eq!(body["transaction_id"], 1);

    let (_, balance) = get(&app, "/balance?account_id=3").await;
    assert_eq!(balance["balance"], "100.00");

    let log = std::fs::read_to_string(config.txlog_path()).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.trim_end().ends_with("|RejectedInsufficientFunds"));
}

#[tokio::test]
async fn transfer_from_foreign_account_is_not_found_and_not_recorded() {
    let (app, config, _temp) = classic_app();

    let (status, body) = post_transfer(
        &app,
        r#"{"source_account":"999","dest_account":"2","amount":10}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "RejectedAccountNotOnPartition");
    assert!(!config.txlog_path().exists());
}

#[tokio::test]
async fn malformed_transfer_bodies_are_bad_requests() {
    let (app, config, _temp) = classic_app();

    let cases = [
        "{not json",
        r#"{"dest_account":"2","amount":10}"#,
        r#"{"source_account":"1","dest_account":"2","amount":0}"#,
        r#"{"source_account":"1","dest_account":"2","amount":-3}"#,
        r#"{"source_account":"1","dest_account":"2","amount":"10.001"}"#,
        r#"{"source_account":"1|1","dest_account":"2","amount":10}"#,
    ];
    for case in cases {
        let (status, _) = post_transfer(&app, case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {}", case);
    }
    assert!(!config.txlog_path().exists());
}

#[tokio::test]
async fn cash_position_on_unreadable_store_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();

    // No seeding: the ledger file does not exist.
    let store = Arc::new(LedgerStore::open(&config).unwrap());
    let log = Arc::new(TransactionLog::open(&config).unwrap());
    let state = AppState {
        engine: Arc::new(TransferEngine::new(store.clone(), log)),
        query: Arc::new(QueryService::new(store)),
    };
    let app = router(state);

    let (status, body) = get(&app, "/cash_position").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("ledger"));
}

#[tokio::test]
async fn metrics_exposition_includes_worker_counters() {
    let (app, _config, _temp) = classic_app();
    post_transfer(
        &app,
        r#"{"source_account":"1","dest_account":"2","amount":1}"#,
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("worker_transfers_total"));
    assert!(text.contains("worker_balance_queries_total"));
}
