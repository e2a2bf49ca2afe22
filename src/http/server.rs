//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway fallback handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Compile configuration into a frozen routing table
//! - Resolve, gate and dispatch every request
//! - Swap in reloaded configuration without locking the hot path

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::extract::{Request, State};
use axum::http::header::InvalidHeaderName;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{validate_config, GatewayConfig};
use crate::http::context::RequestContext;
use crate::http::request::{request_id_middleware, RequestIdExt};
use crate::http::response::{copy_headers, not_found};
use crate::http::target::{header_map, Target, TargetError};
use crate::http::websocket::is_websocket_upgrade;
use crate::load_balancer::UniformRandom;
use crate::observability::{metrics, spans};
use crate::routing::RoutingTable;
use crate::security::AccessPolicy;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("route `{prefix}`: {source}")]
    Target {
        prefix: String,
        #[source]
        source: TargetError,
    },
    #[error("response headers: {0}")]
    ResponseHeaders(#[source] TargetError),
    #[error("auth source: {0}")]
    AuthSource(#[from] InvalidHeaderName),
    #[error("route `{0}` mixes public and protected targets")]
    ConflictingPublic(String),
    #[error(
        "invalid configuration: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    Invalid(Vec<crate::config::ValidationError>),
}

/// Everything a request needs, rebuilt as a unit on reload.
#[derive(Debug)]
pub struct Gateway {
    pub table: RoutingTable<Target>,
    pub access: AccessPolicy,
    /// Appended to every non-upgrade response.
    pub response_headers: HeaderMap,
}

impl Gateway {
    /// Compile routes, targets and the access policy from `config`.
    ///
    /// A target with weight `w` is registered `w` times under its prefix.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, BuildError> {
        let mut table = RoutingTable::new();
        for route in &config.routes {
            for target in &route.targets {
                let built = Target::from_kind(&target.kind)
                    .map_err(|source| BuildError::Target {
                        prefix: route.prefix.clone(),
                        source,
                    })?
                    .public(route.public);
                for _ in 0..target.weight {
                    table.add(route.prefix.clone(), built.clone());
                }
            }
        }
        Self::with_table(config, table)
    }

    /// Use a caller-built table; everything else comes from `config`.
    ///
    /// All targets under one prefix must agree on `public`.
    pub fn with_table(
        config: &GatewayConfig,
        table: RoutingTable<Target>,
    ) -> Result<Self, BuildError> {
        for prefix in table.prefixes() {
            let targets = table.handlers(prefix).unwrap_or_default();
            if let Some((first, rest)) = targets.split_first() {
                if rest.iter().any(|t| t.public != first.public) {
                    return Err(BuildError::ConflictingPublic(prefix.clone()));
                }
            }
        }
        Ok(Self {
            table,
            access: AccessPolicy::from_config(&config.auth)?,
            response_headers: header_map(&config.security.response_headers)
                .map_err(BuildError::ResponseHeaders)?,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<Gateway>>,
    pub balancer: UniformRandom,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    inner: Arc<ArcSwap<Gateway>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        let gateway = Gateway::from_config(&config)?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create a server around an already compiled gateway.
    pub fn with_gateway(config: GatewayConfig, gateway: Gateway) -> Self {
        let inner = Arc::new(ArcSwap::from_pointee(gateway));
        let state = AppState {
            inner: inner.clone(),
            balancer: UniformRandom::new(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            inner,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request| spans::make_request_span(request)),
            )
            .layer(middleware::from_fn(request_id_middleware))
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Replace the live gateway. In-flight requests finish on the old one.
    pub fn reload(&self, gateway: Gateway) {
        self.inner.store(Arc::new(gateway));
    }

    /// Validate and compile `config`, then swap it in. On error the current
    /// gateway stays live.
    pub fn try_reload(&self, config: &GatewayConfig) -> Result<usize, BuildError> {
        apply_config(&self.inner, config)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace routes, auth and response
    /// headers. Listener, timeout and body limit settings need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.inner.load().table.len(),
            "HTTP server starting"
        );

        let inner = self.inner.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match apply_config(&inner, &config) {
                    Ok(routes) => tracing::info!(routes, "Configuration reloaded"),
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded configuration, keeping current");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Returns the number of prefixes in the new table.
fn apply_config(inner: &ArcSwap<Gateway>, config: &GatewayConfig) -> Result<usize, BuildError> {
    validate_config(config).map_err(BuildError::Invalid)?;
    let gateway = Gateway::from_config(config)?;
    let routes = gateway.table.len();
    inner.store(Arc::new(gateway));
    Ok(routes)
}

/// Append the configured response headers. Upgrade requests leave exactly as
/// the handler built them, including when the gateway rejects them.
fn decorate(response: &mut Response, headers: &HeaderMap, upgrade: bool) {
    if !upgrade {
        copy_headers(response.headers_mut(), headers);
    }
}

/// Resolve the route, run the access gate and hand the request to the
/// selected target.
async fn gateway_handler(State(state): State<AppState>, mut request: Request) -> Response {
    let start_time = Instant::now();
    let gateway = state.inner.load_full();

    let request_id = request
        .request_id()
        .map(ToString::to_string)
        .unwrap_or_default();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let upgrade = is_websocket_upgrade(request.headers());

    // 1. Match Route
    let selected = match gateway.table.route(&path, &state.balancer) {
        Ok(selected) => selected,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "No route matched");
            metrics::record_request(&method, 404, "none", start_time);
            let mut response = not_found();
            decorate(&mut response, &gateway.response_headers, upgrade);
            return response;
        }
    };
    let prefix = selected.prefix.to_string();
    let handler_index = selected.index;
    let target = selected.handler.clone();

    // 2. Access gate
    let access = match gateway
        .access
        .evaluate(request.headers(), &path, target.public)
    {
        Ok(access) => access,
        Err(denied) => {
            tracing::warn!(
                request_id = %request_id,
                prefix = %prefix,
                reason = denied.reason(),
                "Access denied"
            );
            metrics::record_access_denied(denied.reason());
            metrics::record_request(&method, denied.status().as_u16(), &prefix, start_time);
            let mut response = denied.into_response();
            decorate(&mut response, &gateway.response_headers, upgrade);
            return response;
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        prefix = %prefix,
        target = target.kind,
        handler_index,
        upgrade,
        "Dispatching request"
    );

    request.extensions_mut().insert(RequestContext {
        request_id,
        prefix: prefix.clone(),
        handler_index,
        credential: access.credential,
        authorized: access.authorized,
        upgrade,
    });

    // 3. Dispatch
    let mut response = target
        .handler
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    if upgrade {
        metrics::record_upgrade(&prefix);
    }
    decorate(&mut response, &gateway.response_headers, upgrade);

    metrics::record_request(&method, response.status().as_u16(), &prefix, start_time);
    response
}
