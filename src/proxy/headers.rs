//! Header policy for both legs of the proxy.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add forwarded-context headers for the upstream
//! - Inject the resolved bearer credential when the caller sent none
//!
//! Hop-by-hop headers describe a single transport leg and must not
//! cross the proxy boundary. `content-encoding` is in the set because
//! the outbound client decodes compressed upstream bodies before the
//! proxy relays them; relaying the header over a decoded body would
//! corrupt the response. `content-length` is never copied in either
//! direction: both legs reframe the body and recompute it.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers never relayed to or from the upstream.
pub const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-encoding",
];

pub static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// `HeaderName::as_str` is always lowercase, so a direct slice match is
/// case-insensitive on wire input.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Build the outbound header set: everything the caller sent minus
/// `host`, framing, and hop-by-hop headers, plus forwarded context and
/// the resolved credential when no `authorization` header came in.
///
/// Repeated header values survive via `append`, so multi-valued
/// headers like `cookie` cross intact.
pub fn build_upstream_headers(
    inbound: &HeaderMap,
    scheme: &str,
    credential: Option<&str>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in inbound {
        if name == header::HOST || name == header::CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    // The upstream sees its own authority in `host`; the original
    // caller context travels in the x-forwarded pair.
    let forwarded_host = inbound
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if let Ok(value) = HeaderValue::from_str(forwarded_host) {
        headers.insert(&X_FORWARDED_HOST, value);
    }
    if let Ok(value) = HeaderValue::from_str(scheme) {
        headers.insert(&X_FORWARDED_PROTO, value);
    }

    // An inbound authorization header always wins, even when its token
    // is empty. It was copied verbatim above; injection only fills a
    // true absence.
    if let Some(token) = credential {
        if !headers.contains_key(header::AUTHORIZATION) {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(header::AUTHORIZATION, value);
            }
        }
    }

    headers
}

/// Filter the upstream response headers for relay back to the caller.
///
/// `content-length` is dropped along with the hop-by-hop set: the
/// upstream's value describes the encoded body, not the decoded bytes
/// actually relayed.
pub fn filter_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if name == header::CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
