use crate::domain::{Notification, OperationType};
use crate::error::AppError;
use serde::Serialize;

const SERVICE: &str = "proxy";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNotificationRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_type: Option<OperationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<u32>,
}

/// Client for the proxy's notification staging endpoint.
#[derive(Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: super::http_client(),
            base_url,
        }
    }

    pub async fn create_notification(
        &self,
        message: &str,
        operation_type: Option<OperationType>,
        otp: Option<u32>,
    ) -> Result<Notification, AppError> {
        let url = format!("{}/notifications", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&CreateNotificationRequest {
                message,
                operation_type,
                otp,
            })
            .send()
            .await
            .map_err(|err| super::transport_error(SERVICE, err))?;
        let response = super::check(SERVICE, response).await?;

        super::read_json(SERVICE, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_notification_posts_the_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/notifications")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"message":"rejected","operationType":"cash-in"}"#.to_string(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"id":"{}","message":"rejected","operationType":"cash-in"}}"#,
                uuid::Uuid::new_v4()
            ))
            .create_async()
            .await;

        let client = ProxyClient::new(server.url());
        let notification = client
            .create_notification("rejected", Some(OperationType::CashIn), None)
            .await
            .unwrap();

        assert_eq!(notification.message, "rejected");
        mock.assert_async().await;
    }
}
