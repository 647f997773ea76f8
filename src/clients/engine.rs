use crate::domain::{ManageOperationResponse, Operation, OperationAction};
use crate::error::AppError;

const SERVICE: &str = "engine";

/// Client for the operation orchestrator.
#[derive(Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    pub async fn manage_operation(
        &self,
        action: OperationAction,
        operation: &Operation,
    ) -> Result<ManageOperationResponse, AppError> {
        let url = format!(
            "{}/operations/{}",
            self.base_url.trim_end_matches('/'),
            action
        );
        let response = self
            .client
            .post(&url)
            .json(operation)
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;

        super::read_json(SERVICE, response).await
    }
}
