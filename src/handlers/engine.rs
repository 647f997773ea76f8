//! Engine service HTTP surface.

use crate::clients::{DirectoryClient, LedgerClient, ProxyClient, SmsClient};
use crate::config::Config;
use crate::domain::ManageOperationResponse;
use crate::error::AppError;
use crate::health::{check_health, DependencyChecker, PeerChecker};
use crate::services::orchestrator::{OperationRequest, Orchestrator};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct EngineState {
    pub orchestrator: Orchestrator,
    pub started_at: Instant,
    checkers: Arc<Vec<Box<dyn DependencyChecker>>>,
}

impl EngineState {
    pub fn from_config(config: &Config) -> Self {
        let orchestrator = Orchestrator::new(
            DirectoryClient::new(config.mmo_url.clone()),
            LedgerClient::new(config.mmo_url.clone()),
            ProxyClient::new(config.proxy_url.clone()),
            SmsClient::new(config.sms_gateway_url.clone()),
            config.engine_url.clone(),
        );
        let checkers: Vec<Box<dyn DependencyChecker>> = vec![
            Box::new(PeerChecker::new("mmo", config.mmo_url.clone())),
            Box::new(PeerChecker::new("proxy", config.proxy_url.clone())),
        ];

        Self {
            orchestrator,
            started_at: Instant::now(),
            checkers: Arc::new(checkers),
        }
    }
}

pub fn create_engine_app(state: EngineState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/operations/callback", post(callback))
        .route("/operations/:action", post(manage_operation))
        .with_state(state)
}

async fn health(State(state): State<EngineState>) -> Json<crate::health::HealthResponse> {
    Json(check_health("engine", &state.checkers, state.started_at).await)
}

async fn manage_operation(
    State(state): State<EngineState>,
    Path(action): Path<String>,
    Json(request): Json<OperationRequest>,
) -> Result<Json<ManageOperationResponse>, AppError> {
    let response = state.orchestrator.manage(&action, request).await?;
    Ok(Json(response))
}

/// Landing point for MMO transaction callbacks. The sandbox only logs them.
async fn callback(Json(payload): Json<Value>) -> Json<Value> {
    tracing::info!(%payload, "transaction callback received");
    Json(json!({"message": "callback received"}))
}
