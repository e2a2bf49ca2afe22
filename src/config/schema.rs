//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from TOML or YAML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to targets.
    pub routes: Vec<RouteConfig>,

    /// Credential sources and scope grants.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A path prefix and the targets that serve it.
///
/// Two entries with the same prefix are merged: the second entry's targets
/// are appended to the first one's.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix to match (case-sensitive, literal).
    pub prefix: String,

    /// Public routes skip the access gate.
    #[serde(default)]
    pub public: bool,

    /// Interchangeable targets; one is picked at random per request.
    pub targets: Vec<TargetConfig>,
}

/// One target registered under a route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Number of times the target is registered (selection odds multiplier).
    #[serde(default = "default_weight")]
    pub weight: u32,

    #[serde(flatten)]
    pub kind: TargetKind,
}

fn default_weight() -> u32 {
    1
}

/// Built-in target kinds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    /// Fixed response.
    Static {
        #[serde(default = "default_static_status")]
        status: u16,
        #[serde(default)]
        body: String,
        #[serde(default)]
        headers: Vec<HeaderConfig>,
    },
    /// Redirect to another location.
    Redirect {
        location: String,
        #[serde(default = "default_redirect_status")]
        status: u16,
    },
    /// JSON description of the request as the gateway saw it.
    Echo,
    /// Accepts the WebSocket upgrade and echoes every frame back.
    WebsocketEcho,
}

impl TargetKind {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Static { .. } => "static",
            TargetKind::Redirect { .. } => "redirect",
            TargetKind::Echo => "echo",
            TargetKind::WebsocketEcho => "websocket_echo",
        }
    }
}

fn default_static_status() -> u16 {
    200
}

fn default_redirect_status() -> u16 {
    302
}

/// A single header name/value pair. Repeating a name adds another value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HeaderConfig {
    pub name: String,
    pub value: String,
}

/// Authentication and authorization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable the access gate on non-public routes.
    pub enabled: bool,

    /// Ordered credential sources; the first present one wins.
    pub sources: Vec<AuthSourceConfig>,

    /// Known credentials and the scope each one grants.
    pub credentials: Vec<CredentialConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sources: vec![AuthSourceConfig {
                kind: AuthSourceKind::Header,
                name: "Authorization".to_string(),
            }],
            credentials: Vec::new(),
        }
    }
}

/// Where to look for a credential.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthSourceConfig {
    #[serde(rename = "type")]
    pub kind: AuthSourceKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthSourceKind {
    Cookie,
    Header,
}

/// A credential and its space-delimited scope grant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialConfig {
    pub token: String,
    #[serde(default)]
    pub scope: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Headers appended to every non-upgrade response.
    pub response_headers: Vec<HeaderConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            response_headers: Vec::new(),
        }
    }
}
