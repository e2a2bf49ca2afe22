//! Request spans.
//!
//! Every request runs inside a span carrying its correlation id, so log
//! events emitted by handlers can be joined with the access log.

use axum::http::Request;
use tracing::Span;

use crate::http::request::RequestIdExt;

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .request_id()
        .map(|id| id.as_str())
        .unwrap_or_default();
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
