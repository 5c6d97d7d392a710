//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers on both legs of the proxy
//! - Stream the upstream body to the client, counting bytes
//! - Map upstream failures to 500 responses carrying the error text
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Copy errors are logged only; the status line is already on the wire

use std::error::Error as StdError;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Bytes,
    http::{header, uri::InvalidUri, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::Stream;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 5] = [
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// Errors surfaced to the client by the forwarding handler.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream could not be reached or the request could not be sent.
    #[error("{}", error_chain(.0))]
    Upstream(#[source] hyper_util::client::legacy::Error),

    #[error("invalid destination uri: {0}")]
    Uri(#[from] InvalidUri),

    #[error("cannot build upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Render an error followed by its causes, `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Number of body bytes the client should receive, when it is known.
///
/// HEAD answers and 204/304 responses carry no body whatever their
/// `Content-Length` says.
pub fn expected_body_len(method: &Method, status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if *method == Method::HEAD || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Some(0);
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Body stream wrapper that counts the bytes handed to the client.
///
/// Logs the total once the body is complete, a warning if the upstream
/// stream fails, and a warning if the client goes away before the end.
/// A body with a known length is complete as soon as that many bytes went
/// out; the server may drop it without polling for the end of stream.
pub struct CountingStream<S> {
    inner: S,
    written: u64,
    expected: Option<u64>,
    finished: bool,
}

impl<S> CountingStream<S> {
    pub fn new(inner: S, expected: Option<u64>) -> Self {
        let mut stream = Self {
            inner,
            written: 0,
            expected,
            finished: false,
        };
        if expected == Some(0) {
            stream.finish();
        }
        stream
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn finish(&mut self) {
        self.finished = true;
        tracing::debug!(written = self.written, "Written {} bytes", self.written);
    }
}

impl<S, E> Stream for CountingStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.written += chunk.len() as u64;
                if !this.finished && this.expected.is_some_and(|len| this.written >= len) {
                    this.finish();
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                tracing::warn!(written = this.written, error = %e, "Response copy failed");
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !this.finished {
                    this.finish();
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S> Drop for CountingStream<S> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(written = self.written, "Client went away before the response body finished");
        }
    }
}
