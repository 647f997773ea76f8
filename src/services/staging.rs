//! Operation staging: holds customer-initiated operations until an agent or
//! merchant accepts or rejects them, and the notification inbox those
//! channels read from.

use crate::clients::{DirectoryClient, EngineClient};
use crate::domain::{
    Channel, CreatedBy, IdentifierType, ManageOperationResponse, Notification, Operation,
    OperationAction, OperationType, SystemKind,
};
use crate::error::AppError;
use crate::store::{NotificationStore, OperationStore};
use crate::validation::{validate_required, ValidationError};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Body of `POST /operations`. Discriminants arrive as raw strings so a bad
/// spelling surfaces as a 400 with a field name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: BigDecimal,
    pub identifier: String,
    pub system: String,
    #[serde(default)]
    pub merchant_code: Option<String>,
    #[serde(default)]
    pub created_by: CreatedBy,
    #[serde(default)]
    pub created_using: Channel,
}

/// What an agent or merchant console polls: pending operations of its kinds
/// plus the notifications staged for it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelView {
    pub operations: Vec<Operation>,
    pub notifications: Vec<Notification>,
}

const AGENT_KINDS: &[OperationType] = &[OperationType::CashIn, OperationType::CashOut];
const MERCHANT_KINDS: &[OperationType] = &[OperationType::MerchantPayment];

#[derive(Clone)]
pub struct StagingService {
    operations: Arc<dyn OperationStore>,
    notifications: Arc<dyn NotificationStore>,
    directory: DirectoryClient,
    engine: EngineClient,
}

impl StagingService {
    pub fn new(
        operations: Arc<dyn OperationStore>,
        notifications: Arc<dyn NotificationStore>,
        directory: DirectoryClient,
        engine: EngineClient,
    ) -> Self {
        Self {
            operations,
            notifications,
            directory,
            engine,
        }
    }

    /// Stages an operation for the session. Discriminants are checked before
    /// any network call so a bad request leaves no side effects anywhere.
    pub async fn create_operation(
        &self,
        request: CreateOperationRequest,
        otp: u32,
    ) -> Result<Operation, AppError> {
        let system = SystemKind::from_str(&request.system)?;
        let kind = OperationType::from_str(&request.kind)?;
        validate_required("identifier", &request.identifier)?;
        if kind == OperationType::MerchantPayment {
            validate_required("merchantCode", request.merchant_code.as_deref().unwrap_or(""))?;
        }

        let account = self.directory.get_account(&request.identifier).await?;
        let identifier_type = if request.identifier == account.phone_number {
            IdentifierType::PhoneNumber
        } else {
            IdentifierType::Token
        };

        let operation = Operation {
            id: Uuid::new_v4(),
            kind,
            amount: request.amount,
            identifier: request.identifier,
            identifier_type,
            system,
            merchant_code: request.merchant_code,
            customer_info: Some(account.nick_name),
            created_by: request.created_by,
            created_using: request.created_using,
            otp: Some(otp),
        };
        tracing::info!(id = %operation.id, %kind, "operation staged");
        self.operations.add(operation.clone()).await;

        Ok(operation)
    }

    /// Claims the operation and forwards the decision to the engine. The
    /// claim is the removal itself, so a second accept or reject for the same
    /// id gets a 404 instead of a double submission. A forwarding failure
    /// does not restage the operation.
    pub async fn manage_operation(
        &self,
        action_raw: &str,
        id_raw: &str,
    ) -> Result<ManageOperationResponse, AppError> {
        let action = OperationAction::from_str(action_raw)?;
        let id = Uuid::parse_str(id_raw)
            .map_err(|_| ValidationError::new("id", "must be a UUID"))?;

        let operation = self
            .operations
            .remove(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("operation {}", id)))?;

        tracing::info!(%id, %action, "operation claimed");
        self.engine.manage_operation(action, &operation).await
    }

    pub async fn agent_view(&self) -> ChannelView {
        ChannelView {
            operations: self.operations.filter_by_kind(AGENT_KINDS).await,
            notifications: self.notifications.filter_by_kind(AGENT_KINDS).await,
        }
    }

    pub async fn merchant_view(&self) -> ChannelView {
        ChannelView {
            operations: self.operations.filter_by_kind(MERCHANT_KINDS).await,
            notifications: self.notifications.filter_by_kind(MERCHANT_KINDS).await,
        }
    }

    pub async fn create_notification(
        &self,
        message: &str,
        operation_type: Option<OperationType>,
        otp: Option<u32>,
    ) -> Result<Notification, AppError> {
        validate_required("message", message)?;

        let notification = Notification::new(message.to_string(), operation_type, otp);
        self.notifications.add(notification.clone()).await;

        Ok(notification)
    }

    pub async fn delete_notification(&self, id: Uuid) -> Result<Notification, AppError> {
        self.notifications
            .remove(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("notification {}", id)))
    }
}
