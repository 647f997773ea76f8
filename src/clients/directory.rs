use crate::domain::Account;
use crate::error::AppError;

const SERVICE: &str = "account directory";

/// Client for the mmo account directory.
#[derive(Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    /// Fetches account info by phone number or token.
    pub async fn get_account(&self, identifier: &str) -> Result<Account, AppError> {
        let url = format!(
            "{}/accounts/{}",
            self.base_url.trim_end_matches('/'),
            identifier
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;

        super::read_json(SERVICE, response).await
    }

    pub async fn verify_otp(&self, otp: u32) -> Result<Account, AppError> {
        let url = format!(
            "{}/accounts/otp/{}",
            self.base_url.trim_end_matches('/'),
            otp
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;

        super::read_json(SERVICE, response).await
    }

    /// Deletes the account owning the session; the directory cascades
    /// transaction cleanup.
    pub async fn delete_account(&self, otp: u32) -> Result<(), AppError> {
        let url = format!("{}/accounts", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .delete(&url)
            .header("sessionId", otp.to_string())
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        super::check(SERVICE, response).await?;

        Ok(())
    }
}
