//! Token issuance and validation.
//!
//! A token is `indicative + random numeric body + checksum digit`, the same
//! length as the phone number it encodes. Encoding is idempotent per active
//! phone number; invalidation flips the row inactive instead of deleting it.

use crate::domain::TokenRecord;
use crate::error::AppError;
use crate::store::TokenStore;
use crate::validation::{indicative_of, sanitize_string, validate_phone_number};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;

const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// First 16 primes; enough weights for any E.164-sized body.
const PRIMES: [u32; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Prime-weighted checksum: each body digit multiplied by the nth prime,
/// summed, mod 11, mod 10.
pub fn checksum_digit(body: &str) -> u32 {
    let sum: u64 = body
        .chars()
        .filter_map(|ch| ch.to_digit(10))
        .zip(PRIMES.iter())
        .map(|(digit, prime)| u64::from(digit) * u64::from(*prime))
        .sum();

    (sum % 11 % 10) as u32
}

#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Returns the active token for a phone number, minting one if needed.
    pub async fn encode(&self, phone_number: &str) -> Result<TokenRecord, AppError> {
        validate_phone_number(phone_number)?;
        let phone_number = sanitize_string(phone_number);
        let indicative = indicative_of(&phone_number)
            .ok_or_else(|| AppError::UserFacing("phoneNumber: unknown calling code".to_string()))?;

        if let Some(existing) = self.store.find_active_by_phone(&phone_number).await {
            return Ok(existing);
        }

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let candidate = generate_candidate(&indicative, &phone_number);
            if self.store.token_exists(&candidate).await {
                continue;
            }

            let record = TokenRecord::new(phone_number.clone(), indicative, candidate);
            self.store.insert(record.clone()).await;
            return Ok(record);
        }

        Err(AppError::Exhausted(format!(
            "token generation exhausted after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    /// Exact registry lookup. Does not check `active`; an invalidated token
    /// still decodes.
    pub async fn decode(&self, token: &str) -> Result<TokenRecord, AppError> {
        self.store
            .find_by_token(token)
            .await
            .ok_or_else(|| AppError::UserFacing("Invalid token".to_string()))
    }

    /// Marks every row of the phone number inactive. Returns how many rows
    /// were touched.
    pub async fn invalidate(&self, phone_number: &str) -> Result<usize, AppError> {
        validate_phone_number(phone_number)?;
        let phone_number = sanitize_string(phone_number);

        Ok(self.store.deactivate_by_phone(&phone_number).await)
    }
}

/// Builds one candidate token: a random fraction scaled to the body's digit
/// budget, offset by the current timestamp, truncated to the body length.
fn generate_candidate(indicative: &str, phone_number: &str) -> String {
    // One char of the budget goes to the checksum digit.
    let body_len = phone_number.len().saturating_sub(indicative.len() + 1).max(1);

    let fraction: f64 = OsRng.gen();
    let magnitude = 10f64.powi(body_len as i32);
    let seed = (fraction * magnitude).trunc() as u128 + Utc::now().timestamp_millis() as u128;

    let mut body = seed.to_string();
    body.truncate(body_len);
    while body.len() < body_len {
        body.push('0');
    }

    format!("{}{}{}", indicative, body, checksum_digit(&body))
}
