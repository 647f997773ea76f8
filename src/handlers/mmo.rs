//! MMO service HTTP surface: the account directory and the transaction
//! ledger live behind one router.

use crate::clients::{ProxyClient, TokensClient};
use crate::config::Config;
use crate::domain::{
    Account, Merchant, StartTransactionResponse, TransactionRequest, TransactionStatus,
    TransactionType,
};
use crate::error::AppError;
use crate::health::{check_health, DependencyChecker, PeerChecker};
use crate::services::{AccountDirectory, LedgerService};
use crate::store::{MemoryAccountStore, MemoryTransactionStore};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Clone)]
pub struct MmoState {
    pub directory: AccountDirectory,
    pub ledger: LedgerService,
    pub started_at: Instant,
    checkers: Arc<Vec<Box<dyn DependencyChecker>>>,
}

impl MmoState {
    pub fn from_config(config: &Config) -> Self {
        // The directory and the ledger share one transaction store so
        // account deletion can cascade without a network hop.
        let transactions = Arc::new(MemoryTransactionStore::new());
        let directory = AccountDirectory::new(
            Arc::new(MemoryAccountStore::new()),
            transactions.clone(),
            TokensClient::new(config.token_url.clone()),
            config.otp_digits,
            config.mock_phone_prefix.clone(),
        );
        let ledger = LedgerService::new(transactions, ProxyClient::new(config.proxy_url.clone()));
        let checkers: Vec<Box<dyn DependencyChecker>> = vec![
            Box::new(PeerChecker::new("token", config.token_url.clone())),
            Box::new(PeerChecker::new("proxy", config.proxy_url.clone())),
        ];

        Self {
            directory,
            ledger,
            started_at: Instant::now(),
            checkers: Arc::new(checkers),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub phone_number: String,
}

pub fn create_mmo_app(state: MmoState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/accounts", post(create_account).delete(delete_account))
        .route("/accounts/mock", post(create_mock_account))
        .route("/accounts/otp/:otp", get(verify_otp))
        .route("/accounts/:identifier", get(get_account))
        .route("/merchants", get(merchants))
        .route("/transactions/type/:kind", post(create_transaction))
        // The leading segment is a phone number for GET and a UUID for
        // DELETE; the router needs one shared name for that position.
        .route("/transactions/:id/:status", get(get_transaction))
        .route("/transactions/:id", delete(resolve_transaction))
        .with_state(state)
}

async fn health(State(state): State<MmoState>) -> Json<crate::health::HealthResponse> {
    Json(check_health("mmo", &state.checkers, state.started_at).await)
}

async fn create_account(
    State(state): State<MmoState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = state
        .directory
        .create_user_account(&request.nick_name, &request.phone_number)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

async fn create_mock_account(
    State(state): State<MmoState>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = state.directory.create_mock_account().await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn delete_account(
    State(state): State<MmoState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let otp = super::session_id(&headers)?;
    let (_, dropped) = state.directory.delete_by_otp(otp).await?;

    Ok(Json(json!({
        "message": "account deleted",
        "transactionsDropped": dropped.len(),
    })))
}

async fn verify_otp(
    State(state): State<MmoState>,
    Path(otp): Path<String>,
) -> Result<Json<Account>, AppError> {
    let otp = crate::validation::parse_session_id(&otp)?;
    let account = state.directory.verify_otp(otp).await?;

    Ok(Json(account))
}

async fn get_account(
    State(state): State<MmoState>,
    Path(identifier): Path<String>,
) -> Result<Json<Account>, AppError> {
    let account = state.directory.get_account(&identifier).await?;
    Ok(Json(account))
}

async fn merchants(State(state): State<MmoState>) -> Json<Vec<Merchant>> {
    Json(state.directory.merchants())
}

async fn create_transaction(
    State(state): State<MmoState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<StartTransactionResponse>), AppError> {
    let kind = TransactionType::from_str(&kind)?;
    let callback_url = headers
        .get("X-Callback-URL")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::UserFacing("X-Callback-URL header is required".to_string()))?;

    let response = state
        .ledger
        .start_transaction(kind, callback_url, request)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_transaction(
    State(state): State<MmoState>,
    Path((phone_number, status)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<crate::domain::Transaction>, AppError> {
    let otp = super::session_id(&headers)?;
    state.directory.verify_otp(otp).await?;

    let status = TransactionStatus::from_str(&status)?;
    let transaction = state.ledger.get_transaction(&phone_number, status).await?;

    Ok(Json(transaction))
}

async fn resolve_transaction(
    State(state): State<MmoState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::UserFacing("id: must be a UUID".to_string()))?;
    let transaction = state.ledger.resolve_transaction(id).await?;

    Ok(Json(json!({
        "message": "transaction resolved",
        "id": transaction.id,
    })))
}
