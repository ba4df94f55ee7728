//! The forwarding operation, one linear pass per request.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     -> resolve upstream base URL (per-request config read)
//!     -> build upstream URL (caller's query kept, path discarded)
//!     -> resolve bearer credential (header, then cookies)
//!     -> filter + inject headers
//!     -> buffer body (non-GET/HEAD)
//!     -> UpstreamClient::send (timeout-bounded, no redirects)
//!     -> relay stream, or rewrite non-2xx non-JSON bodies into the
//!        JSON error envelope
//! ```
//!
//! No retries and no shared mutable state: every failure surfaces to
//! the caller exactly once.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method};
use axum::response::{IntoResponse, Json, Response};
use url::Url;
use uuid::Uuid;

use crate::config::UpstreamSource;
use crate::error::{ErrorEnvelope, ProxyError};
use crate::http::server::AppState;
use crate::proxy::client::{TransportError, UpstreamResponse};
use crate::proxy::{credentials, headers};

/// Longest upstream error-body excerpt carried in the envelope.
const ERROR_DETAIL_CHARS: usize = 500;

/// Tighter bound for the excerpt that goes to the log.
const LOG_DETAIL_CHARS: usize = 300;

/// Catch-all handler: every method, every sub-path.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match forward(&state, &request_id, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn forward(
    state: &AppState,
    request_id: &str,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, inbound_body) = request.into_parts();

    let upstream_url = match resolve_base_url(state.upstream.as_ref())
        .and_then(|base| build_upstream_url(&base, parts.uri.query()))
    {
        Ok(url) => url,
        Err(err) => {
            tracing::error!(request_id, error = %err, "Proxy configuration error");
            return Err(err);
        }
    };

    let scheme = parts.uri.scheme_str().unwrap_or("http");
    let credential = credentials::bearer_token(&parts.headers);
    let outbound_headers =
        headers::build_upstream_headers(&parts.headers, scheme, credential.as_deref());
    let body = read_inbound_body(&parts.method, inbound_body, request_id).await?;

    tracing::debug!(
        request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        upstream = %upstream_url,
        "Forwarding request"
    );

    let upstream_response = match state
        .client
        .send(parts.method, &upstream_url, outbound_headers, body)
        .await
    {
        Ok(response) => response,
        Err(TransportError::Timeout) => {
            tracing::error!(request_id, upstream = %upstream_url, "Upstream request timed out");
            return Err(ProxyError::Timeout {
                upstream: upstream_url,
            });
        }
        Err(TransportError::Connect(detail)) => {
            tracing::error!(
                request_id,
                upstream = %upstream_url,
                detail = %detail,
                "Failed to reach upstream"
            );
            return Err(ProxyError::Unreachable {
                upstream: upstream_url,
            });
        }
    };

    relay(upstream_url, request_id, upstream_response).await
}

/// The configured endpoint with a single trailing slash stripped.
/// Missing or empty configuration fails the request, never the
/// process.
fn resolve_base_url(source: &dyn UpstreamSource) -> Result<String, ProxyError> {
    let raw = source
        .base_url()
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingBaseUrl)?;
    Ok(raw.strip_suffix('/').unwrap_or(&raw).to_string())
}

/// The base URL verbatim with only the caller's query string attached.
///
/// Sub-paths under the mount point are intentionally discarded: this
/// proxy fronts exactly one upstream endpoint, so `/api/foo?x=1` and
/// `/api/bar?x=1` must behave identically.
fn build_upstream_url(base_url: &str, query: Option<&str>) -> Result<String, ProxyError> {
    let mut url = Url::parse(base_url).map_err(|_| ProxyError::InvalidBaseUrl)?;
    url.set_query(query.filter(|value| !value.is_empty()));
    Ok(url.to_string())
}

/// GET and HEAD carry no body; everything else is buffered in full and
/// forwarded unchanged.
async fn read_inbound_body(
    method: &Method,
    body: Body,
    request_id: &str,
) -> Result<Option<Bytes>, ProxyError> {
    if *method == Method::GET || *method == Method::HEAD {
        return Ok(None);
    }
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) => {
            tracing::error!(request_id, error = %err, "Failed to read inbound request body");
            Err(ProxyError::InboundBody)
        }
    }
}

/// Relay the upstream response, rewriting non-2xx responses that lack
/// JSON bodies into the structured envelope so error paths always
/// yield parseable JSON.
async fn relay(
    upstream_url: String,
    request_id: &str,
    upstream: UpstreamResponse,
) -> Result<Response, ProxyError> {
    let mut response_headers = headers::filter_response_headers(&upstream.headers);

    if !upstream.status.is_success() && !is_json(&upstream.headers) {
        let bytes = match axum::body::to_bytes(upstream.body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(
                    request_id,
                    upstream = %upstream_url,
                    error = %err,
                    "Failed to read upstream error body"
                );
                return Err(ProxyError::Unreachable {
                    upstream: upstream_url,
                });
            }
        };

        let detail: String = String::from_utf8_lossy(&bytes)
            .chars()
            .take(ERROR_DETAIL_CHARS)
            .collect();

        let log_excerpt: String = detail.chars().take(LOG_DETAIL_CHARS).collect();
        tracing::warn!(
            request_id,
            status = upstream.status.as_u16(),
            upstream = %upstream_url,
            detail = %log_excerpt,
            "Rewriting upstream error response"
        );

        // The rewritten body is fresh JSON; the upstream's content
        // headers no longer describe it.
        response_headers.remove(header::CONTENT_TYPE);
        response_headers.remove(header::CONTENT_LENGTH);

        let envelope = ErrorEnvelope {
            error: "Upstream returned an error.".to_string(),
            status: Some(upstream.status.as_u16()),
            upstream: Some(upstream_url),
            detail: Some(detail),
        };
        return Ok((upstream.status, response_headers, Json(envelope)).into_response());
    }

    tracing::debug!(
        request_id,
        status = upstream.status.as_u16(),
        "Relaying upstream response"
    );

    let mut response = Response::new(upstream.body);
    *response.status_mut() = upstream.status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}
