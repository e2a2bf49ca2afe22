//! Meownest: a prefix-routing HTTP/WebSocket gateway library.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ──▶ routing (longest prefix) ──▶ load_balancer
//!                           │                                            │
//!                           ▼                                            ▼
//!                    security gate ◀──────────── selected target ────────┘
//!                           │
//!                           ▼
//!     Client Response ◀── target handler (static, redirect, echo, websocket, custom)
//!
//!     Cross-cutting: config (load/validate/watch), observability, lifecycle
//! ```
//!
//! Routes are registered into a [`RoutingTable`] while it is mutable, then the
//! table is frozen inside a [`Gateway`] and shared by the server. Reloading
//! replaces the whole gateway atomically.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Traffic management
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::{Gateway, HttpServer, Target};
pub use lifecycle::Shutdown;
pub use routing::RoutingTable;
