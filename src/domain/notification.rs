//! Notification entity: a message staged for an agent or merchant channel.

use crate::domain::operation::OperationType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<OperationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<u32>,
}

impl Notification {
    pub fn new(message: String, operation_type: Option<OperationType>, otp: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            operation_type,
            otp,
        }
    }
}
