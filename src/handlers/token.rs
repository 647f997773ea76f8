//! Token service HTTP surface.

use crate::domain::TokenRecord;
use crate::error::AppError;
use crate::health::check_health;
use crate::services::TokenService;
use crate::store::MemoryTokenStore;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct TokenState {
    pub service: TokenService,
    pub started_at: Instant,
}

impl TokenState {
    pub fn new() -> Self {
        Self {
            service: TokenService::new(Arc::new(MemoryTokenStore::new())),
            started_at: Instant::now(),
        }
    }
}

impl Default for TokenState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_token_app(state: TokenState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tokens/decode/:token", get(decode))
        .route("/tokens/:phone_number", get(encode).delete(invalidate))
        .with_state(state)
}

async fn health(State(state): State<TokenState>) -> Json<crate::health::HealthResponse> {
    // The token service calls no peers.
    Json(check_health("token", &[], state.started_at).await)
}

async fn encode(
    State(state): State<TokenState>,
    Path(phone_number): Path<String>,
) -> Result<Json<Value>, AppError> {
    // The full record stays internal; callers only get the token itself.
    let record = state.service.encode(&phone_number).await?;
    Ok(Json(json!({"token": record.token})))
}

async fn decode(
    State(state): State<TokenState>,
    Path(token): Path<String>,
) -> Result<Json<TokenRecord>, AppError> {
    let record = state.service.decode(&token).await?;
    Ok(Json(record))
}

async fn invalidate(
    State(state): State<TokenState>,
    Path(phone_number): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deactivated = state.service.invalidate(&phone_number).await?;
    Ok(Json(json!({
        "message": "token deleted",
        "deactivated": deactivated,
    })))
}
