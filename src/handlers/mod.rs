//! HTTP surface of the four services. Each submodule owns one service's
//! state, router and handlers.

pub mod engine;
pub mod mmo;
pub mod proxy;
pub mod token;

pub use engine::{create_engine_app, EngineState};
pub use mmo::{create_mmo_app, MmoState};
pub use proxy::{create_proxy_app, ProxyState};
pub use token::{create_token_app, TokenState};

use crate::error::AppError;
use crate::validation::parse_session_id;
use axum::http::HeaderMap;

pub const SESSION_HEADER: &str = "sessionId";

/// Extracts and parses the `sessionId` header.
pub(crate) fn session_id(headers: &HeaderMap) -> Result<u32, AppError> {
    let raw = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::UserFacing("sessionId header is required".to_string()))?;

    Ok(parse_session_id(raw)?)
}
