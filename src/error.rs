//! Error taxonomy and the JSON envelope returned for proxy-detected
//! failures.
//!
//! Every failure the proxy detects itself becomes a structured JSON
//! body, so API clients never have to parse free-form error pages. The
//! `Display` text of each variant is the exact `error` field on the
//! wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

/// Failures detected by the proxy itself, mapped onto the wire
/// contract.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `API_BASE_URL` is unset or empty. A deployment problem, not a
    /// caller problem, but reported per request instead of crashing.
    #[error("Missing API_BASE_URL environment variable.")]
    MissingBaseUrl,

    /// `API_BASE_URL` is set but does not parse as an absolute URL.
    #[error("Invalid API_BASE_URL environment variable.")]
    InvalidBaseUrl,

    /// The inbound request body could not be read from the caller.
    #[error("Failed to read request body.")]
    InboundBody,

    /// The upstream exchange exceeded its timeout budget.
    #[error("Upstream request timed out.")]
    Timeout { upstream: String },

    /// The upstream could not be reached: DNS, connect, TLS, or a
    /// stream broken mid-response.
    #[error("Failed to reach upstream.")]
    Unreachable { upstream: String },
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingBaseUrl | ProxyError::InvalidBaseUrl => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::InboundBody => StatusCode::BAD_REQUEST,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn upstream(&self) -> Option<&str> {
        match self {
            ProxyError::Timeout { upstream } | ProxyError::Unreachable { upstream } => {
                Some(upstream)
            }
            _ => None,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error: self.to_string(),
            status: None,
            upstream: self.upstream().map(str::to_string),
            detail: None,
        };
        (self.status(), Json(envelope)).into_response()
    }
}

/// JSON body for proxy-detected failures and rewritten upstream
/// errors. Fields that do not apply are omitted from the serialized
/// form entirely.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Stable, human-readable summary of what failed.
    pub error: String,
    /// Upstream HTTP status, on the error-rewrite path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Fully resolved upstream URL the proxy targeted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
    /// Bounded excerpt of the upstream error body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
