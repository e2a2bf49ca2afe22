//! Per-request context.

/// What the gateway decided about a request before dispatching it.
///
/// Inserted into the request extensions right before the selected handler
/// runs and dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id (empty when entropy was unavailable).
    pub request_id: String,
    /// Prefix the path resolved to.
    pub prefix: String,
    /// Index of the selected handler within the route.
    pub handler_index: usize,
    /// Credential found by the configured sources, if any.
    pub credential: Option<String>,
    /// True when the access gate ran and the scope covered the path.
    pub authorized: bool,
    /// WebSocket upgrade request.
    pub upgrade: bool,
}
