//! Typed HTTP clients for the peer services.
//!
//! Each client wraps a `reqwest::Client` and a base URL. Failures are
//! surfaced after a single attempt: downstream HTTP errors are reclassified
//! by status code (preserving the upstream message), transport errors are
//! logged and wrapped generically.

pub mod directory;
pub mod engine;
pub mod ledger;
pub mod proxy;
pub mod sms;
pub mod tokens;

pub use directory::DirectoryClient;
pub use engine::EngineClient;
pub use ledger::LedgerClient;
pub use proxy::ProxyClient;
pub use sms::SmsClient;
pub use tokens::TokensClient;

use crate::error::AppError;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Passes successful responses through; turns everything else into the
/// matching `AppError`, keeping the upstream `{error}` text when present.
pub(crate) async fn check(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("{} returned status {}", service, status));

    tracing::error!(service, %status, %message, "downstream call failed");
    Err(AppError::from_upstream(status, message))
}

pub(crate) fn transport_error(service: &str, err: reqwest::Error) -> AppError {
    tracing::error!(service, error = %err, "downstream service unreachable");
    AppError::UserFacing(format!("{} service unavailable", service))
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &str,
    response: reqwest::Response,
) -> Result<T, AppError> {
    response.json::<T>().await.map_err(|err| {
        tracing::error!(service, error = %err, "invalid response body");
        AppError::UserFacing(format!("{} returned an invalid response", service))
    })
}
