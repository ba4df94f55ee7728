//! Outbound transport capability.
//!
//! # Responsibilities
//! - One send operation covering the whole upstream exchange
//! - Classify failures as timeout vs. connection-level
//! - Surface redirects to the caller instead of following them
//!
//! The trait keeps forwarding logic independent of the concrete
//! transport, so failure paths are exercised in tests with a canned
//! client instead of real sockets.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

/// Transport-level failure of one upstream exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The exchange did not complete within the timeout budget.
    #[error("upstream exchange exceeded its timeout budget")]
    Timeout,
    /// DNS, connect, TLS, or a stream failure before the response
    /// head arrived.
    #[error("{0}")]
    Connect(String),
}

/// Upstream response as seen by the forwarding layer: status, headers,
/// and a lazily consumed body stream.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Capability for issuing the outbound request.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Issue `method url` with the given headers and optional buffered
    /// body. Implementations must not follow redirects and must bound
    /// the entire exchange with their configured timeout.
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, TransportError>;
}

/// Production transport backed by a pooled reqwest client.
pub struct ReqwestClient {
    inner: reqwest::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Build a transport with the given exchange timeout.
    ///
    /// Redirects are surfaced to the caller rather than followed, and
    /// compressed upstream bodies are decoded before relay, which is
    /// what makes stripping `content-encoding` downstream safe.
    pub fn new(timeout: Duration) -> Self {
        // The upstream URL is dialed directly; deployment proxy
        // variables do not apply to this hop.
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .expect("Failed to construct outbound HTTP client");
        Self { inner, timeout }
    }
}

#[async_trait]
impl UpstreamClient for ReqwestClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, TransportError> {
        let mut request = self
            .inner
            .request(method, url)
            .headers(headers)
            .timeout(self.timeout);
        if let Some(bytes) = body {
            request = request.body(bytes);
        }

        let response = request.send().await.map_err(classify)?;

        Ok(UpstreamResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(err.to_string())
    }
}
