//! The forwarding handler.
//!
//! Every request, whatever its method or path, lands here:
//! - `OPTIONS` is answered locally from the CORS policy
//! - everything else is sent to the single upstream and streamed back
//!
//! CORS headers are applied last so they win over anything the upstream sent.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use tower::ServiceExt;

use crate::http::client::destination_uri;
use crate::http::cors::{apply_cors_headers, preflight_headers, resolve_origin};
use crate::http::response::{expected_body_len, strip_hop_by_hop, CountingStream, ProxyError};
use crate::http::server::AppState;

pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let origin = resolve_origin(state.config.fixed_origin(), request.headers());

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    let mut response = match destination_uri(&state.upstream, &path_and_query) {
        Ok(destination) if request.method() == Method::OPTIONS => {
            tracing::debug!(url = %destination, "CORS asked for {}", destination);
            preflight(&request)
        }
        Ok(destination) => {
            tracing::debug!(
                method = %request.method(),
                url = %destination,
                "Create request for {}",
                destination
            );
            match forward(&state, destination, request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Upstream request failed");
                    e.into_response()
                }
            }
        }
        Err(e) => {
            let e = ProxyError::from(e);
            tracing::error!(path = %path_and_query, error = %e, "Cannot build destination uri");
            e.into_response()
        }
    };

    apply_cors_headers(response.headers_mut(), origin, state.config.methods);
    response
}

/// Answer a preflight without contacting the upstream.
fn preflight(request: &Request<Body>) -> Response {
    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .extend(preflight_headers(request.headers()));
    response
}

/// Send the request upstream and turn the answer into a streaming response.
///
/// The inbound body is handed to the client as is, so its framing follows
/// the body itself: an empty GET goes out without one, a streamed HTTP/2
/// upload goes out chunked.
async fn forward(
    state: &AppState,
    destination: Uri,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    // Without an override the client derives Host from the destination uri.
    headers.remove(header::HOST);
    if let Some(host) = state.config.host_override() {
        match HeaderValue::from_str(host) {
            Ok(value) => {
                headers.insert(header::HOST, value);
            }
            Err(_) => tracing::warn!(host = %host, "Host override is not a valid header value"),
        }
    }

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(destination)
        .body(body)?;
    *outbound.headers_mut() = headers;

    let client = state.clients.for_inbound(state.inbound).clone();
    let upstream: Response<Incoming> = client
        .oneshot(outbound)
        .await
        .map_err(ProxyError::Upstream)?;

    let (mut parts, incoming) = upstream.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    let expected = expected_body_len(&method, parts.status, &parts.headers);

    let body = Body::from_stream(CountingStream::new(
        Body::new(incoming).into_data_stream(),
        expected,
    ));
    Ok(Response::from_parts(parts, body))
}
