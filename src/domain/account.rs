//! Account domain entity.
//! One row per registered customer; the OTP is the session handle all
//! downstream services use to scope a request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub nick_name: String,
    pub phone_number: String,
    pub indicative: String,
    pub otp: u32,
    pub active: bool,
}

impl Account {
    pub fn new(nick_name: String, phone_number: String, indicative: String, otp: u32) -> Self {
        Self {
            nick_name,
            phone_number,
            indicative,
            otp,
            active: true,
        }
    }
}
