//! Request correlation.
//!
//! # Responsibilities
//! - Generate a correlation id for every request (`req_` + base64url(16 bytes))
//! - Attach it as a typed extension and as the `x-request-id` header
//! - Echo it back on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Inbound `x-request-id` values are replaced, never trusted
//! - Entropy failure degrades to an empty id; the request still proceeds

use std::fmt;

use axum::extract::{Request, State};
use axum::http::{Extensions, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque per-request correlation id. Not a security token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh id from the OS entropy source.
    pub fn generate() -> Self {
        Self::generate_from(&mut OsRng)
    }

    pub fn generate_from<R: RngCore>(rng: &mut R) -> Self {
        Self(generate_with(rng))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produce `req_<base64url(16 random bytes)>`, or an empty string if `rng`
/// cannot supply entropy.
pub fn generate_with<R: RngCore>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    match rng.try_fill_bytes(&mut bytes) {
        Ok(()) => format!("req_{}", URL_SAFE_NO_PAD.encode(bytes)),
        Err(e) => {
            tracing::warn!(error = %e, "Entropy source failed, request id left empty");
            String::new()
        }
    }
}

/// Access to the request id stored by [`request_id_middleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for Extensions {
    fn request_id(&self) -> Option<&RequestId> {
        self.get::<RequestId>()
    }
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().request_id()
    }
}

/// Source of request ids for [`request_id_middleware_with`].
pub type IdGenerator = fn() -> RequestId;

/// Stamp every request and its response with a fresh correlation id.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    stamp(RequestId::generate(), request, next).await
}

/// [`request_id_middleware`] with a caller-chosen generator, for
/// `axum::middleware::from_fn_with_state`.
pub async fn request_id_middleware_with(
    State(generate): State<IdGenerator>,
    request: Request,
    next: Next,
) -> Response {
    stamp(generate(), request, next).await
}

async fn stamp(id: RequestId, mut request: Request, next: Next) -> Response {
    let header = (!id.is_empty())
        .then(|| HeaderValue::from_str(id.as_str()).ok())
        .flatten();

    let headers = request.headers_mut();
    headers.remove(X_REQUEST_ID);
    if let Some(value) = &header {
        headers.insert(X_REQUEST_ID, value.clone());
    }
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    struct NoEntropy;

    impl RngCore for NoEntropy {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy unavailable"))
        }
    }

    #[test]
    fn test_id_format() {
        let id = RequestId::generate();
        let s = id.as_str();
        assert!(s.starts_with("req_"));
        // 16 bytes → 22 base64 characters without padding.
        assert_eq!(s.len(), 4 + 22);
        assert!(s[4..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn test_entropy_failure_yields_empty() {
        assert_eq!(generate_with(&mut NoEntropy), "");
    }

    #[tokio::test]
    async fn test_middleware_replaces_inbound_id() {
        let app = Router::new()
            .route(
                "/",
                get(|req: Request| async move {
                    let ext = req.request_id().cloned().unwrap_or_default();
                    let header = req
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    assert_eq!(ext.as_str(), header);
                    header
                }),
            )
            .layer(axum::middleware::from_fn(request_id_middleware));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("x-request-id", "client-supplied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let header = response
            .headers()
            .get(X_REQUEST_ID)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(header.starts_with("req_"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, header.as_bytes());
    }

    fn empty_id() -> RequestId {
        RequestId::generate_from(&mut NoEntropy)
    }

    #[tokio::test]
    async fn test_empty_id_sets_no_header() {
        let app = Router::new()
            .route(
                "/",
                get(|req: Request| async move {
                    assert!(req.headers().get(X_REQUEST_ID).is_none());
                    assert_eq!(req.request_id(), Some(&RequestId::default()));
                    "through"
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                empty_id as IdGenerator,
                request_id_middleware_with,
            ));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("x-request-id", "client-supplied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert!(response.headers().get(X_REQUEST_ID).is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "through".as_bytes());
    }
}
