//! Account directory: registration, identifier resolution and session (OTP)
//! verification, plus the cascading cleanup that keeps the transaction store
//! consistent when an account goes away.

use crate::clients::TokensClient;
use crate::domain::{Account, Merchant, Transaction};
use crate::error::AppError;
use crate::store::{AccountStore, TransactionStore};
use crate::validation::{
    indicative_of, sanitize_string, validate_max_len, validate_phone_number, validate_required,
    NICKNAME_MAX_LEN, PHONE_NUMBER_MAX_LEN,
};
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;

const MAX_GENERATION_ATTEMPTS: u32 = 10;

#[derive(Clone)]
pub struct AccountDirectory {
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    tokens: TokensClient,
    otp_digits: u32,
    mock_phone_prefix: String,
    merchants: Vec<Merchant>,
}

impl AccountDirectory {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
        tokens: TokensClient,
        otp_digits: u32,
        mock_phone_prefix: String,
    ) -> Self {
        Self {
            accounts,
            transactions,
            tokens,
            otp_digits,
            mock_phone_prefix,
            merchants: seed_merchants(),
        }
    }

    /// Registers an account and hands back its session OTP. The identifier
    /// must not collide with an existing account's phone number or token; a
    /// token passes phone validation, so a plain phone check is not enough.
    pub async fn create_user_account(
        &self,
        nick_name: &str,
        phone_number: &str,
    ) -> Result<Account, AppError> {
        let nick_name = sanitize_string(nick_name);
        let phone_number = sanitize_string(phone_number);

        validate_required("nickName", &nick_name)?;
        validate_max_len("nickName", &nick_name, NICKNAME_MAX_LEN)?;
        validate_required("phoneNumber", &phone_number)?;
        validate_max_len("phoneNumber", &phone_number, PHONE_NUMBER_MAX_LEN)?;
        validate_phone_number(&phone_number)?;

        let indicative = indicative_of(&phone_number)
            .ok_or_else(|| AppError::UserFacing("phoneNumber: unknown calling code".to_string()))?;

        if self.resolve_account(&phone_number).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "account already exists for {}",
                phone_number
            )));
        }

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let otp = generate_otp(self.otp_digits);
            if self.accounts.otp_in_use(otp).await {
                continue;
            }

            let account = Account::new(
                nick_name.clone(),
                phone_number.clone(),
                indicative.clone(),
                otp,
            );
            self.accounts.insert(account.clone()).await;
            tracing::info!(phone_number = %account.phone_number, "account created");
            return Ok(account);
        }

        Err(AppError::Exhausted(format!(
            "otp generation exhausted after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    /// Registers a throwaway account on a generated phone number under the
    /// configured mock prefix.
    pub async fn create_mock_account(&self) -> Result<Account, AppError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let suffix: u32 = OsRng.gen_range(0..10_000);
            let phone_number = format!("{}{:04}", self.mock_phone_prefix, suffix);
            if self.accounts.find_by_phone(&phone_number).await.is_some() {
                continue;
            }

            return self.create_user_account("Mock user", &phone_number).await;
        }

        Err(AppError::Exhausted(format!(
            "mock phone number generation exhausted after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    /// Looks an account up by phone number or token. Unknown identifiers
    /// resolve to `None`; only transport-level failures against the token
    /// service propagate.
    pub async fn resolve_account(&self, identifier: &str) -> Result<Option<Account>, AppError> {
        let identifier = sanitize_string(identifier);

        if let Some(account) = self.accounts.find_by_phone(&identifier).await {
            return Ok(Some(account));
        }

        let record = match self.tokens.decode(&identifier).await {
            Ok(record) => record,
            Err(AppError::UserFacing(_)) | Err(AppError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(self.accounts.find_by_phone(&record.phone_number).await)
    }

    pub async fn get_account(&self, identifier: &str) -> Result<Account, AppError> {
        self.resolve_account(identifier)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", identifier)))
    }

    /// Session verification: every proxied call presents its OTP here.
    pub async fn verify_otp(&self, otp: u32) -> Result<Account, AppError> {
        self.accounts
            .find_by_otp(otp)
            .await
            .ok_or_else(|| AppError::NotFound(format!("account for session {}", otp)))
    }

    /// Deletes the account owning the session and drops every transaction
    /// tagged with it.
    pub async fn delete_by_otp(&self, otp: u32) -> Result<(Account, Vec<Transaction>), AppError> {
        let account = self
            .accounts
            .remove_by_otp(otp)
            .await
            .ok_or_else(|| AppError::NotFound(format!("account for session {}", otp)))?;
        let dropped = self.transactions.remove_by_otp(otp).await;
        tracing::info!(
            phone_number = %account.phone_number,
            transactions = dropped.len(),
            "account deleted"
        );

        Ok((account, dropped))
    }

    pub fn merchants(&self) -> Vec<Merchant> {
        self.merchants.clone()
    }

    /// Scheduled wipe of the whole directory. Returns how many accounts were
    /// dropped.
    pub async fn wipe_accounts(&self) -> usize {
        let dropped = self.accounts.clear().await;
        if dropped > 0 {
            tracing::info!(accounts = dropped, "scheduled account wipe");
        }
        dropped
    }
}

/// A fixed-width OTP: `digits` decimal digits, never leading-zero.
fn generate_otp(digits: u32) -> u32 {
    let lower = 10u32.pow(digits.saturating_sub(1));
    let upper = 10u32.pow(digits);

    OsRng.gen_range(lower..upper)
}

fn seed_merchants() -> Vec<Merchant> {
    vec![
        Merchant::new("0001", "Corner Grocery", true),
        Merchant::new("0002", "City Pharmacy", true),
        Merchant::new("0003", "Transit Kiosk", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryAccountStore, MemoryTransactionStore};

    fn directory(token_url: &str) -> AccountDirectory {
        AccountDirectory::new(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTransactionStore::new()),
            TokensClient::new(token_url.to_string()),
            4,
            "+4416329".to_string(),
        )
    }

    #[test]
    fn otps_have_the_configured_width() {
        for _ in 0..50 {
            let otp = generate_otp(4);
            assert!((1000..10_000).contains(&otp));
        }
    }

    #[tokio::test]
    async fn registration_assigns_indicative_and_otp() {
        let directory = directory("http://127.0.0.1:1");
        let account = directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        assert_eq!(account.indicative, "+44");
        assert!((1000..10_000).contains(&account.otp));
        assert!(account.active);
    }

    #[tokio::test]
    async fn duplicate_phone_number_conflicts() {
        let directory = directory("http://127.0.0.1:1");
        directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        let err = directory
            .create_user_account("Other", "+441632960067")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn registration_rejects_bad_input() {
        let directory = directory("http://127.0.0.1:1");

        assert!(directory
            .create_user_account("", "+441632960067")
            .await
            .is_err());
        assert!(directory
            .create_user_account(&"x".repeat(51), "+441632960067")
            .await
            .is_err());
        assert!(directory
            .create_user_account("Test", "not-a-phone")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn registration_with_an_existing_accounts_token_conflicts() {
        let mut server = mockito::Server::new_async().await;
        let _decode = server
            .mock("GET", "/tokens/decode/+449876543210")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"phoneNumber":"+441632960067","indicative":"+44","token":"+449876543210","active":true}"#,
            )
            .create_async()
            .await;

        let directory = directory(&server.url());
        directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        let err = directory
            .create_user_account("Other", "+449876543210")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // The token still resolves to its owner.
        let account = directory.get_account("+449876543210").await.unwrap();
        assert_eq!(account.phone_number, "+441632960067");
    }

    #[tokio::test]
    async fn otp_saturation_fails_after_bounded_attempts() {
        let accounts = Arc::new(MemoryAccountStore::new());
        // One-digit OTPs leave nine slots; occupy them all.
        for otp in 1..=9 {
            accounts
                .insert(Account::new(
                    format!("Holder {}", otp),
                    format!("+44163296006{}", otp),
                    "+44".to_string(),
                    otp,
                ))
                .await;
        }
        let directory = AccountDirectory::new(
            accounts,
            Arc::new(MemoryTransactionStore::new()),
            TokensClient::new("http://127.0.0.1:1".to_string()),
            1,
            "+4416329".to_string(),
        );

        let err = directory
            .create_user_account("Test", "+441632960170")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Exhausted(_)));
    }

    #[tokio::test]
    async fn concurrent_registrations_get_unique_otps() {
        let directory = Arc::new(directory("http://127.0.0.1:1"));
        let mut handles = Vec::new();
        for i in 0..5 {
            let directory = directory.clone();
            handles.push(tokio::spawn(async move {
                directory
                    .create_user_account("Test", &format!("+44163296010{}", i))
                    .await
                    .unwrap()
            }));
        }

        let mut otps = std::collections::HashSet::new();
        for handle in handles {
            let account = handle.await.unwrap();
            assert!(otps.insert(account.otp));
        }
    }

    #[tokio::test]
    async fn mock_accounts_land_under_the_prefix() {
        let directory = directory("http://127.0.0.1:1");
        let account = directory.create_mock_account().await.unwrap();

        assert!(account.phone_number.starts_with("+4416329"));
        assert_eq!(account.phone_number.len(), "+441632960067".len() - 1);
        assert_eq!(account.nick_name, "Mock user");
    }

    #[tokio::test]
    async fn resolves_by_phone_without_calling_the_token_service() {
        // Unroutable token URL: a phone hit must never reach it.
        let directory = directory("http://127.0.0.1:1");
        directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        let account = directory.get_account("+441632960067").await.unwrap();
        assert_eq!(account.nick_name, "Test");
    }

    #[tokio::test]
    async fn resolves_by_token_via_the_token_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tokens/decode/+449999999990")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"phoneNumber":"+441632960067","indicative":"+44","token":"+449999999990","active":true}"#,
            )
            .create_async()
            .await;

        let directory = directory(&server.url());
        directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        let account = directory.get_account("+449999999990").await.unwrap();
        assert_eq!(account.phone_number, "+441632960067");
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tokens/decode/+449999999990")
            .with_status(400)
            .with_body(r#"{"error":"Invalid token","status":400}"#)
            .create_async()
            .await;

        let directory = directory(&server.url());
        let err = directory.get_account("+449999999990").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn session_verification_round_trips() {
        let directory = directory("http://127.0.0.1:1");
        let account = directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();

        let verified = directory.verify_otp(account.otp).await.unwrap();
        assert_eq!(verified.phone_number, account.phone_number);
        assert!(matches!(
            directory.verify_otp(1).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deletion_cascades_to_tagged_transactions() {
        use crate::domain::{Channel, CreatedBy, IdentifierType, SystemKind, TransactionType};
        use bigdecimal::BigDecimal;

        let accounts = Arc::new(MemoryAccountStore::new());
        let transactions = Arc::new(MemoryTransactionStore::new());
        let directory = AccountDirectory::new(
            accounts,
            transactions.clone(),
            TokensClient::new("http://127.0.0.1:1".to_string()),
            4,
            "+4416329".to_string(),
        );

        let account = directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();
        transactions
            .insert(Transaction::new(
                account.phone_number.clone(),
                TransactionType::Deposit,
                "http://localhost/callback".to_string(),
                SystemKind::Mock,
                BigDecimal::from(100),
                None,
                IdentifierType::PhoneNumber,
                Some(account.otp),
                CreatedBy::Customer,
                Channel::Sms,
            ))
            .await;

        let (deleted, dropped) = directory.delete_by_otp(account.otp).await.unwrap();
        assert_eq!(deleted.phone_number, "+441632960067");
        assert_eq!(dropped.len(), 1);
        assert!(matches!(
            directory.delete_by_otp(account.otp).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn wipe_drops_every_account() {
        let directory = directory("http://127.0.0.1:1");
        directory
            .create_user_account("Test", "+441632960067")
            .await
            .unwrap();
        directory
            .create_user_account("Other", "+441632960068")
            .await
            .unwrap();

        assert_eq!(directory.wipe_accounts().await, 2);
        assert_eq!(directory.wipe_accounts().await, 0);
    }

    #[test]
    fn merchant_directory_is_seeded() {
        let directory = directory("http://127.0.0.1:1");
        let merchants = directory.merchants();

        assert!(!merchants.is_empty());
        assert!(merchants.iter().any(|m| m.available));
    }
}
