//! Transaction domain entity.
//! The MMO-side record of a money movement accepted by the orchestrator.

use crate::domain::operation::{Channel, CreatedBy, IdentifierType, SystemKind};
use crate::validation::ValidationError;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdrawal")]
    Withdrawal,
    #[serde(rename = "merchantpayment")]
    MerchantPayment,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::MerchantPayment => "merchantpayment",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "merchantpayment" => Ok(TransactionType::MerchantPayment),
            _ => Err(ValidationError::new(
                "type",
                "must be one of: deposit, withdrawal, merchantpayment",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "accepted")]
    Accepted,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Accepted => write!(f, "accepted"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(TransactionStatus::Pending),
            "accepted" => Ok(TransactionStatus::Accepted),
            _ => Err(ValidationError::new(
                "status",
                "must be one of: pending, accepted",
            )),
        }
    }
}

/// GSMA-style party entry (`{key: "msisdn", value: "+44..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub key: String,
    pub value: String,
}

impl Party {
    pub fn msisdn(phone_number: &str) -> Self {
        Self {
            key: "msisdn".to_string(),
            value: phone_number.to_string(),
        }
    }
}

/// Body of `POST /transactions/type/:type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub amount: BigDecimal,
    pub debit_party: Vec<Party>,
    pub credit_party: Vec<Party>,
    pub system: SystemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    pub identifier_type: IdentifierType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<u32>,
    #[serde(default)]
    pub created_by: CreatedBy,
    #[serde(default)]
    pub created_using: Channel,
}

impl TransactionRequest {
    /// The phone number carried by the first msisdn party, credit side
    /// first.
    pub fn msisdn(&self) -> Option<&str> {
        self.credit_party
            .iter()
            .chain(self.debit_party.iter())
            .find(|party| party.key == "msisdn")
            .map(|party| party.value.as_str())
    }
}

/// Response of `POST /transactions/type/:type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTransactionResponse {
    pub server_correlation_id: Uuid,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub callback_url: String,
    pub status: TransactionStatus,
    pub system: SystemKind,
    pub amount: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    pub identifier_type: IdentifierType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<u32>,
    #[serde(default)]
    pub created_by: CreatedBy,
    #[serde(default)]
    pub created_using: Channel,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        phone_number: String,
        kind: TransactionType,
        callback_url: String,
        system: SystemKind,
        amount: BigDecimal,
        merchant: Option<String>,
        identifier_type: IdentifierType,
        otp: Option<u32>,
        created_by: CreatedBy,
        created_using: Channel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number,
            kind,
            callback_url,
            status: TransactionStatus::Pending,
            system,
            amount,
            merchant,
            identifier_type,
            otp,
            created_by,
            created_using,
            created_at: Utc::now(),
        }
    }
}
