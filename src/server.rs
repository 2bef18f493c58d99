//! HTTP transport surface
//!
//! Thin plumbing over the core: method dispatch, query-string and JSON
//! parsing, and the response envelopes the router expects. All business
//! decisions live in the engine and the stores.

use crate::{
    metrics::METRICS,
    types::{normalize_amount, AccountId, TransferRequest, TransferStatus},
    Error, QueryService, TransferEngine,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Transfer engine for the origin leg
    pub engine: Arc<TransferEngine>,
    /// Read-only queries
    pub query: Arc<QueryService>,
}

/// Build the worker's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/balance", get(balance))
        .route("/cash_position", get(cash_position))
        .route("/transfer", post(transfer))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Transport-level error, mapped onto a status code and a JSON envelope
pub enum ApiError {
    /// Required parameter absent (400)
    MissingParam(&'static str),
    /// Bad input (400)
    BadRequest(String),
    /// Account not on this partition (404)
    NotFound(String),
    /// Storage or consistency failure (500)
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingParam(name) => (
                StatusCode::BAD_REQUEST,
                format!("{} is required", name),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "timestamp": Utc::now(),
            })),
        )
            .into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::AccountNotFound(_) => ApiError::NotFound(err.to_string()),
            Error::Validation(_) => ApiError::BadRequest(err.to_string()),
            Error::Storage(_) | Error::Io(_) | Error::DebitNotRecorded { .. } | Error::Config(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ledger-worker",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
struct BalanceParams {
    #[serde(default)]
    account_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    account_id: AccountId,
    balance: Decimal,
}

async fn balance(
    State(state): State<AppState>,
    Query(params): Query<BalanceParams>,
) -> Result<Json<BalanceResponse>, ApiError> {
    METRICS.balance_queries_total.inc();

    let account_id = params
        .account_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParam("account_id"))?;
    let account_id = AccountId::new(account_id);

    let balance = state.query.balance_of(&account_id)?;
    Ok(Json(BalanceResponse {
        account_id,
        balance: normalize_amount(balance),
    }))
}

#[derive(Debug, Serialize)]
struct CashPositionResponse {
    partition_total: Decimal,
}

async fn cash_position(
    State(state): State<AppState>,
) -> Result<Json<CashPositionResponse>, ApiError> {
    METRICS.cash_position_queries_total.inc();

    let total = state.query.partition_cash_position()?;
    Ok(Json(CashPositionResponse {
        partition_total: normalize_amount(total),
    }))
}

async fn transfer(
    State(state): State<AppState>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    METRICS.transfers_total.inc();

    let Json(request) =
        body.map_err(|e| ApiError::BadRequest(format!("Malformed transfer body: {}", e)))?;

    let timer = METRICS.transfer_duration_seconds.start_timer();
    let result = state.engine.execute(&request);
    timer.observe_duration();

    match result {
        Ok(receipt) => match receipt.status {
            TransferStatus::Confirmed => {
                METRICS.transfers_confirmed_total.inc();
                Ok((StatusCode::OK, Json(receipt)).into_response())
            }
            TransferStatus::RejectedInsufficientFunds => {
                METRICS.transfers_rejected_insufficient_funds_total.inc();
                Ok((
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "Insufficient funds",
                        "status": receipt.status,
                        "transaction_id": receipt.transaction_id,
                        "timestamp": Utc::now(),
                    })),
                )
                    .into_response())
            }
        },
        Err(Error::AccountNotFound(id)) => {
            METRICS.transfers_rejected_not_on_partition_total.inc();
            Ok((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("Source account {} not on this partition", id),
                    "status": "RejectedAccountNotOnPartition",
                    "timestamp": Utc::now(),
                })),
            )
                .into_response())
        }
        Err(err @ Error::DebitNotRecorded { .. }) => {
            METRICS.transfer_inconsistencies_total.inc();
            tracing::error!(error = %err, "Transfer inconsistency: debit committed, log append failed");
            Err(ApiError::Internal(err.to_string()))
        }
        Err(err @ (Error::Storage(_) | Error::Io(_))) => {
            METRICS.transfer_storage_failures_total.inc();
            Err(ApiError::from(err))
        }
        Err(err) => Err(ApiError::from(err)),
    }
}

async fn metrics_handler() -> Result<String, ApiError> {
    METRICS
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))
}
