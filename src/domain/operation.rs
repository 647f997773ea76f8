//! Operation domain entities.
//! An operation is a staged money-movement request awaiting an agent or
//! merchant accept/reject decision.

use crate::domain::transaction::TransactionType;
use crate::validation::ValidationError;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    #[serde(rename = "cash-in")]
    CashIn,
    #[serde(rename = "cash-out")]
    CashOut,
    #[serde(rename = "merchant-payment")]
    MerchantPayment,
}

impl OperationType {
    pub const ALLOWED: &'static [&'static str] = &["cash-in", "cash-out", "merchant-payment"];

    /// MMO transaction type this operation maps to. Cash-out intentionally
    /// stays on deposit, matching the sandbox MMO API.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            OperationType::CashIn | OperationType::CashOut => TransactionType::Deposit,
            OperationType::MerchantPayment => TransactionType::MerchantPayment,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            OperationType::CashIn => "cash-in",
            OperationType::CashOut => "cash-out",
            OperationType::MerchantPayment => "merchant-payment",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for OperationType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cash-in" => Ok(OperationType::CashIn),
            "cash-out" => Ok(OperationType::CashOut),
            "merchant-payment" => Ok(OperationType::MerchantPayment),
            _ => Err(ValidationError::new(
                "type",
                format!("must be one of: {}", Self::ALLOWED.join(", ")),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationAction {
    #[serde(rename = "accept")]
    Accept,
    #[serde(rename = "reject")]
    Reject,
}

impl fmt::Display for OperationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationAction::Accept => write!(f, "accept"),
            OperationAction::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for OperationAction {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "accept" => Ok(OperationAction::Accept),
            "reject" => Ok(OperationAction::Reject),
            _ => Err(ValidationError::new("action", "must be one of: accept, reject")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemKind {
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "live")]
    Live,
}

impl SystemKind {
    pub const ALLOWED: &'static [&'static str] = &["mock", "live"];
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemKind::Mock => write!(f, "mock"),
            SystemKind::Live => write!(f, "live"),
        }
    }
}

impl FromStr for SystemKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mock" => Ok(SystemKind::Mock),
            "live" => Ok(SystemKind::Live),
            _ => Err(ValidationError::new(
                "system",
                format!("must be one of: {}", Self::ALLOWED.join(", ")),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierType {
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "token")]
    Token,
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierType::PhoneNumber => write!(f, "phoneNumber"),
            IdentifierType::Token => write!(f, "token"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CreatedBy {
    #[default]
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "merchant")]
    Merchant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Channel {
    #[default]
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "USSD")]
    Ussd,
}

/// Response of the engine's `POST /operations/:action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManageOperationResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub amount: BigDecimal,
    pub identifier: String,
    pub identifier_type: IdentifierType,
    pub system: SystemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<String>,
    #[serde(default)]
    pub created_by: CreatedBy,
    #[serde(default)]
    pub created_using: Channel,
    /// Session the operation was staged under; tags the resulting
    /// transaction for cascading cleanup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<u32>,
}
