use crate::domain::{StartTransactionResponse, TransactionRequest, TransactionType};
use crate::error::AppError;

const SERVICE: &str = "transaction store";

/// Client for the mmo transaction store.
#[derive(Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    pub async fn create_transaction(
        &self,
        kind: TransactionType,
        callback_url: &str,
        request: &TransactionRequest,
    ) -> Result<StartTransactionResponse, AppError> {
        let url = format!(
            "{}/transactions/type/{}",
            self.base_url.trim_end_matches('/'),
            kind
        );
        let response = self
            .client
            .post(&url)
            .header("X-Callback-URL", callback_url)
            .json(request)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;

        super::read_json(SERVICE, response).await
    }
}
