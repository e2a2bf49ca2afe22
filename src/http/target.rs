//! Route targets.
//!
//! A target is whatever serves a request once the router has chosen it.
//! Embedders can register any tower service; the config file can name the
//! built-in kinds below.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower::util::BoxCloneSyncService;
use tower::Service;

use crate::config::{HeaderConfig, TargetKind};
use crate::http::context::RequestContext;
use crate::http::response::copy_headers;
use crate::http::websocket;

/// Type-erased request handler stored in the routing table.
pub type Handler = BoxCloneSyncService<Request, Response, Infallible>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid status code {0}")]
    Status(u16),
    #[error("invalid header `{0}`")]
    Header(String),
    #[error("invalid redirect location `{0}`")]
    Location(String),
}

/// A handler plus the route settings it was registered with.
#[derive(Clone)]
pub struct Target {
    pub handler: Handler,
    /// Skip the access gate.
    pub public: bool,
    /// Short label for logs.
    pub kind: &'static str,
}

impl Target {
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        Self {
            handler: BoxCloneSyncService::new(service),
            public: false,
            kind: "custom",
        }
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Build one of the built-in target kinds.
    pub fn from_kind(kind: &TargetKind) -> Result<Self, TargetError> {
        let router: Router = match kind {
            TargetKind::Static {
                status,
                body,
                headers,
            } => {
                let fixed = Arc::new(FixedResponse {
                    status: status_code(*status)?,
                    headers: header_map(headers)?,
                    body: body.clone(),
                });
                Router::new().fallback(move || {
                    let fixed = fixed.clone();
                    async move { fixed.render() }
                })
            }
            TargetKind::Redirect { location, status } => {
                let status = status_code(*status)?;
                if !status.is_redirection() {
                    return Err(TargetError::Status(status.as_u16()));
                }
                let location = HeaderValue::from_str(location)
                    .map_err(|_| TargetError::Location(location.clone()))?;
                Router::new().fallback(move || {
                    let location = location.clone();
                    async move { (status, [(LOCATION, location)]).into_response() }
                })
            }
            TargetKind::Echo => Router::new().fallback(echo),
            TargetKind::WebsocketEcho => Router::new().fallback(websocket::echo_socket),
        };

        Ok(Self {
            kind: kind.label(),
            ..Self::new(router)
        })
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("kind", &self.kind)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

struct FixedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl FixedResponse {
    fn render(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        copy_headers(response.headers_mut(), &self.headers);
        response
    }
}

async fn echo(request: Request) -> Json<serde_json::Value> {
    let ctx = request.extensions().get::<RequestContext>();
    Json(serde_json::json!({
        "request_id": ctx.map(|c| c.request_id.as_str()),
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "query": request.uri().query(),
        "prefix": ctx.map(|c| c.prefix.as_str()),
        "handler_index": ctx.map(|c| c.handler_index),
        "authenticated": ctx.is_some_and(|c| c.credential.is_some()),
        "authorized": ctx.is_some_and(|c| c.authorized),
        "upgrade": ctx.is_some_and(|c| c.upgrade),
    }))
}

fn status_code(status: u16) -> Result<StatusCode, TargetError> {
    StatusCode::from_u16(status).map_err(|_| TargetError::Status(status))
}

/// Compile configured headers, keeping repeated names as extra values.
pub fn header_map(headers: &[HeaderConfig]) -> Result<HeaderMap, TargetError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let invalid = || TargetError::Header(header.name.clone());
        let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(&header.value).map_err(|_| invalid())?;
        map.append(name, value);
    }
    Ok(map)
}
