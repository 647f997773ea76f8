//! Operation orchestrator: turns an accepted staged operation into an MMO
//! transaction and a confirmation SMS, or fans a rejection out to the
//! notification channel.

use crate::clients::{DirectoryClient, LedgerClient, ProxyClient, SmsClient};
use crate::domain::{
    ManageOperationResponse, OperationAction, OperationType, Party, SystemKind,
    TransactionRequest,
};
use crate::error::AppError;
use crate::validation::validate_required;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::domain::{Channel, CreatedBy, IdentifierType};

/// Body of `POST /operations/:action`. The discriminant fields arrive as raw
/// strings so a bad spelling surfaces as a 400 with a field name, not a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: BigDecimal,
    pub identifier: String,
    pub system: String,
    #[serde(default)]
    pub merchant_code: Option<String>,
    #[serde(default)]
    pub customer_info: Option<String>,
    #[serde(default)]
    pub created_by: CreatedBy,
    #[serde(default)]
    pub created_using: Channel,
    #[serde(default)]
    pub otp: Option<u32>,
}

#[derive(Clone)]
pub struct Orchestrator {
    directory: DirectoryClient,
    ledger: LedgerClient,
    proxy: ProxyClient,
    sms: SmsClient,
    public_url: String,
}

impl Orchestrator {
    pub fn new(
        directory: DirectoryClient,
        ledger: LedgerClient,
        proxy: ProxyClient,
        sms: SmsClient,
        public_url: String,
    ) -> Self {
        Self {
            directory,
            ledger,
            proxy,
            sms,
            public_url,
        }
    }

    pub async fn manage(
        &self,
        action_raw: &str,
        request: OperationRequest,
    ) -> Result<ManageOperationResponse, AppError> {
        let action = OperationAction::from_str(action_raw)?;
        let kind = OperationType::from_str(&request.kind)?;
        let system = SystemKind::from_str(&request.system)?;
        validate_required("identifier", &request.identifier)?;

        let account = self.directory.get_account(&request.identifier).await?;
        let identifier_type = if request.identifier == account.phone_number {
            IdentifierType::PhoneNumber
        } else {
            IdentifierType::Token
        };

        match action {
            OperationAction::Accept => {
                self.accept(kind, system, identifier_type, &account.phone_number, request)
                    .await
            }
            OperationAction::Reject => self.reject(kind, &account.phone_number, request).await,
        }
    }

    async fn accept(
        &self,
        kind: OperationType,
        system: SystemKind,
        identifier_type: IdentifierType,
        phone_number: &str,
        request: OperationRequest,
    ) -> Result<ManageOperationResponse, AppError> {
        let callback_url = format!(
            "{}/operations/callback",
            self.public_url.trim_end_matches('/')
        );
        let transaction = TransactionRequest {
            amount: request.amount.clone(),
            debit_party: vec![Party::msisdn(phone_number)],
            credit_party: vec![Party::msisdn(phone_number)],
            system,
            merchant: request.merchant_code,
            identifier_type,
            otp: request.otp,
            created_by: request.created_by,
            created_using: request.created_using,
        };

        let created = self
            .ledger
            .create_transaction(kind.transaction_type(), &callback_url, &transaction)
            .await?;
        tracing::info!(
            correlation_id = %created.server_correlation_id,
            %kind,
            "operation accepted"
        );

        // The sandbox has no real PIN flow; the confirmation SMS carries a
        // fixed placeholder.
        let message = format!(
            "Please confirm the {} of {} with PIN 0000",
            kind, request.amount
        );
        self.sms.send(phone_number, &message).await?;

        Ok(ManageOperationResponse {
            status: created.status.to_string(),
        })
    }

    async fn reject(
        &self,
        kind: OperationType,
        phone_number: &str,
        request: OperationRequest,
    ) -> Result<ManageOperationResponse, AppError> {
        let message = format!(
            "The {} operation for {} of amount {} was rejected",
            kind, request.identifier, request.amount
        );

        self.proxy
            .create_notification(&message, Some(kind), request.otp)
            .await?;
        self.sms.send(phone_number, &message).await?;
        tracing::info!(%kind, identifier = %request.identifier, "operation rejected");

        Ok(ManageOperationResponse {
            status: "reject".to_string(),
        })
    }
}
