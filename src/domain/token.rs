//! Token registry row: an opaque customer token derived from a phone number.
//! Invalidation flips `active` instead of deleting the row.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub phone_number: String,
    pub indicative: String,
    pub token: String,
    pub active: bool,
}

impl TokenRecord {
    pub fn new(phone_number: String, indicative: String, token: String) -> Self {
        Self {
            phone_number,
            indicative,
            token,
            active: true,
        }
    }
}
