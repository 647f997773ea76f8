use crate::domain::TokenRecord;
use crate::error::AppError;
use serde::Deserialize;

const SERVICE: &str = "token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Client for the token service.
#[derive(Clone)]
pub struct TokensClient {
    client: reqwest::Client,
    base_url: String,
}

impl TokensClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    pub async fn encode(&self, phone_number: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/tokens/{}",
            self.base_url.trim_end_matches('/'),
            phone_number
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;
        let body: TokenResponse = super::read_json(SERVICE, response).await?;

        Ok(body.token)
    }

    pub async fn decode(&self, token: &str) -> Result<TokenRecord, AppError> {
        let url = format!(
            "{}/tokens/decode/{}",
            self.base_url.trim_end_matches('/'),
            token
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

    pub async fn invalidate(&self, phone_number: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/tokens/{}",
            self.base_url.trim_end_matches('/'),
            phone_number
        );
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        super::check(SERVICE, response).await?;

        Ok(())
    }
}
