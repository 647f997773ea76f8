//! Proxy service HTTP surface: operation staging, the notification inbox and
//! the SMS/USSD message endpoints. Every session-scoped route touches the
//! tracker so the expiry sweep sees activity.

use crate::clients::{DirectoryClient, EngineClient, TokensClient};
use crate::config::Config;
use crate::domain::{Channel, ManageOperationResponse, Notification, Operation, OperationType};
use crate::error::AppError;
use crate::health::{check_health, DependencyChecker, PeerChecker};
use crate::services::staging::{ChannelView, CreateOperationRequest, StagingService};
use crate::services::MessageRouter;
use crate::store::{MemoryNotificationStore, MemoryOperationStore, SessionTracker};
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
pub struct ProxyState {
    pub staging: StagingService,
    pub router: MessageRouter,
    pub sessions: Arc<SessionTracker>,
    pub started_at: Instant,
    checkers: Arc<Vec<Box<dyn DependencyChecker>>>,
}

impl ProxyState {
    pub fn from_config(config: &Config) -> Self {
        let sessions = Arc::new(SessionTracker::new());
        let staging = StagingService::new(
            Arc::new(MemoryOperationStore::new()),
            Arc::new(MemoryNotificationStore::new()),
            DirectoryClient::new(config.mmo_url.clone()),
            EngineClient::new(config.engine_url.clone()),
        );
        let router = MessageRouter::new(
            sessions.clone(),
            DirectoryClient::new(config.mmo_url.clone()),
            TokensClient::new(config.token_url.clone()),
            staging.clone(),
        );
        let checkers: Vec<Box<dyn DependencyChecker>> = vec![
            Box::new(PeerChecker::new("token", config.token_url.clone())),
            Box::new(PeerChecker::new("mmo", config.mmo_url.clone())),
            Box::new(PeerChecker::new("engine", config.engine_url.clone())),
        ];

        Self {
            staging,
            router,
            sessions,
            started_at: Instant::now(),
            checkers: Arc::new(checkers),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub otp: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub message: String,
}

pub fn create_proxy_app(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/operations", post(create_operation))
        .route("/operations/agent", get(agent_view))
        .route("/operations/merchant", get(merchant_view))
        .route("/operations/:action/:id", post(manage_operation))
        .route("/notifications", post(create_notification))
        .route("/notifications/:id", delete(delete_notification))
        .route("/messages", get(latest_message))
        .route("/messages/sms", post(sms_message))
        .route("/messages/ussd", post(ussd_message))
        .with_state(state)
}

async fn health(State(state): State<ProxyState>) -> Json<crate::health::HealthResponse> {
    Json(check_health("proxy", &state.checkers, state.started_at).await)
}

async fn create_operation(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    Json(request): Json<CreateOperationRequest>,
) -> Result<(StatusCode, Json<Operation>), AppError> {
    let otp = super::session_id(&headers)?;
    state.sessions.touch(otp);

    let operation = state.staging.create_operation(request, otp).await?;
    Ok((StatusCode::CREATED, Json(operation)))
}

async fn manage_operation(
    State(state): State<ProxyState>,
    Path((action, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ManageOperationResponse>, AppError> {
    let otp = super::session_id(&headers)?;
    state.sessions.touch(otp);

    let response = state.staging.manage_operation(&action, &id).await?;
    Ok(Json(response))
}

async fn agent_view(State(state): State<ProxyState>) -> Json<ChannelView> {
    Json(state.staging.agent_view().await)
}

async fn merchant_view(State(state): State<ProxyState>) -> Json<ChannelView> {
    Json(state.staging.merchant_view().await)
}

async fn create_notification(
    State(state): State<ProxyState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let operation_type = request
        .operation_type
        .as_deref()
        .map(OperationType::from_str)
        .transpose()?;

    let notification = state
        .staging
        .create_notification(&request.message, operation_type, request.otp)
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

async fn delete_notification(
    State(state): State<ProxyState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::UserFacing("id: must be a UUID".to_string()))?;
    let notification = state.staging.delete_notification(id).await?;

    Ok(Json(json!({
        "message": "notification deleted",
        "id": notification.id,
    })))
}

async fn sms_message(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    Json(inbound): Json<InboundMessage>,
) -> Result<Json<Value>, AppError> {
    handle_message(&state, &headers, &inbound.message, Channel::Sms).await
}

async fn ussd_message(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    Json(inbound): Json<InboundMessage>,
) -> Result<Json<Value>, AppError> {
    handle_message(&state, &headers, &inbound.message, Channel::Ussd).await
}

async fn handle_message(
    state: &ProxyState,
    headers: &HeaderMap,
    text: &str,
    channel: Channel,
) -> Result<Json<Value>, AppError> {
    let otp = super::session_id(headers)?;
    let reply = state.router.handle(otp, text, channel).await?;

    Ok(Json(json!({"message": reply})))
}

async fn latest_message(
    State(state): State<ProxyState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let otp = super::session_id(&headers)?;
    state.sessions.touch(otp);

    let reply = state.router.latest_reply(otp)?;
    Ok(Json(json!({"message": reply})))
}
