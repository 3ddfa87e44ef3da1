//! Error taxonomy for the proxy.
//!
//! Every failure a handler can produce maps onto a fixed HTTP status:
//! client input problems are 400, upstream failures are 502, and anything
//! unexpected is a 500 whose details stay in the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Request-scoped proxy failure.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required query parameter was absent.
    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    /// The caller-supplied target was not an absolute http/https URL.
    #[error("invalid target URL")]
    InvalidTarget,

    /// The inbound request body could not be read (too large or aborted).
    #[error("failed to read request body")]
    BodyRead(#[source] axum::Error),

    /// The upstream request failed before a response arrived.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Anything unexpected. Details are logged, never sent to the client.
    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingParam(_) | ProxyError::InvalidTarget | ProxyError::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::Upstream(e) => {
                tracing::warn!(error = %e, "Upstream request failed");
                "Bad gateway".to_string()
            }
            ProxyError::Internal(msg) => {
                tracing::error!(error = %msg, "Unhandled internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        // (StatusCode, String) responds as text/plain; charset=utf-8
        (status, body).into_response()
    }
}
