use crate::error::AppError;
use serde::Serialize;

const SERVICE: &str = "sms gateway";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendSmsRequest<'a> {
    phone_number: &'a str,
    message: &'a str,
}

/// Client for the external SMS gateway.
#[derive(Clone)]
pub struct SmsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SmsClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    pub async fn send(&self, phone_number: &str, message: &str) -> Result<(), AppError> {
        let url = format!("{}/sms/send", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&SendSmsRequest {
                phone_number,
                message,
            })
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        super::check(SERVICE, response).await?;

        Ok(())
    }
}
