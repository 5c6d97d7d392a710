//! CORS header policy.
//!
//! Pure functions over header maps so the forwarding handler stays a thin
//! sequence of steps. The effective origin is computed per request and
//! never stored.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Methods advertised when default methods are enabled.
///
/// HEAD is listed twice; clients already depend on the exact string.
pub const DEFAULT_ALLOW_METHODS: &str =
    "GET, PUT, POST, HEAD, TRACE, DELETE, PATCH, COPY, HEAD, LINK, OPTIONS";

/// Origin used when neither the configuration nor the request names one.
///
/// Browsers reject `*` together with `Access-Control-Allow-Credentials: true`.
/// That pairing only reaches callers that sent no `Origin` at all, which a
/// browser making a cross-origin request never does, so credentialed browser
/// requests always get their own origin echoed. Non-browser callers ignore
/// both headers.
pub const FALLBACK_ORIGIN: &str = "*";

const REQUEST_PREFIX: &str = "access-control-request";

/// Pick the `Access-Control-Allow-Origin` value for one request.
///
/// A configured origin always wins. Otherwise the request's `Origin` header
/// is used, then the last value of any other header whose name contains
/// `origin`, then [`FALLBACK_ORIGIN`].
pub fn resolve_origin(configured: Option<&str>, headers: &HeaderMap) -> HeaderValue {
    if let Some(origin) = configured.and_then(|o| HeaderValue::from_str(o).ok()) {
        return origin;
    }

    if let Some(origin) = headers.get(header::ORIGIN) {
        return origin.clone();
    }

    headers
        .iter()
        .filter(|(name, _)| name.as_str().contains("origin"))
        .map(|(_, value)| value.clone())
        .last()
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_ORIGIN))
}

/// Set the CORS headers on a response, replacing any existing values.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: HeaderValue, methods: bool) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    if methods {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(DEFAULT_ALLOW_METHODS),
        );
    }
}

/// Echo every `Access-Control-Request-*` header back as `Access-Control-Allow-*`.
///
/// Only the first `request` in the name is rewritten, so
/// `Access-Control-Request-Method` becomes `Access-Control-Allow-Method`.
pub fn preflight_headers(request: &HeaderMap) -> HeaderMap {
    let mut allowed = HeaderMap::new();
    for (name, value) in request {
        if !name.as_str().contains(REQUEST_PREFIX) {
            continue;
        }
        let renamed = name.as_str().replacen("request", "allow", 1);
        if let Ok(name) = HeaderName::from_bytes(renamed.as_bytes()) {
            allowed.append(name, value.clone());
        }
    }
    allowed
}
