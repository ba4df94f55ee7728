//! Caller credential resolution.
//!
//! The proxy forwards bearer tokens without inspecting or verifying
//! them; trust decisions belong to the upstream service. Resolution
//! only decides WHICH token travels, never whether it is valid.

use axum::http::{header, HeaderMap};

/// Cookies consulted when the `authorization` header carries no usable
/// token, in priority order.
pub const TOKEN_COOKIES: [&str; 3] = ["jwt", "token", "auth_token"];

/// Resolve the caller's bearer credential.
///
/// `Authorization: Bearer <token>` wins when present, with the scheme
/// matched case-insensitively and the token trimmed; an empty token
/// counts as absent. Otherwise the fallback cookies are scanned in
/// order and the first non-empty value wins.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = strip_bearer(value) {
            return Some(token.to_string());
        }
    }

    TOKEN_COOKIES
        .iter()
        .find_map(|name| cookie_value(headers, name))
}

fn strip_bearer(value: &str) -> Option<&str> {
    // HeaderValue::to_str only succeeds for ASCII, so byte indexing is
    // char-boundary safe.
    if value.len() < 7 || !value[..7].eq_ignore_ascii_case("bearer ") {
        return None;
    }
    let token = value[7..].trim();
    (!token.is_empty()).then_some(token)
}

/// First non-empty occurrence of `name` across all `cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if key.trim() == name && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
