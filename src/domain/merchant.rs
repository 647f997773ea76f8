use serde::{Deserialize, Serialize};

/// Static merchant directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub code: String,
    pub name: String,
    pub available: bool,
}

impl Merchant {
    pub fn new(code: &str, name: &str, available: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            available,
        }
    }
}
