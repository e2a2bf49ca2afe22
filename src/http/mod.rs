//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (add request ID)
//!     → [routing table picks target]
//!     → [security gate checks credential scope]
//!     → websocket.rs (classify upgrade requests)
//!     → target.rs (selected handler serves the request)
//!     → response.rs (append configured headers)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;
pub mod target;
pub mod websocket;

pub use context::RequestContext;
pub use request::{IdGenerator, RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{BuildError, Gateway, HttpServer};
pub use target::{Handler, Target};
