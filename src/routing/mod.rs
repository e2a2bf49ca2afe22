//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact key lookup, then prefix scan)
//!     → matcher.rs (scan order, literal prefix test)
//!     → load_balancer (pick one handler of the matched set)
//!     → Return: selected handler or NoRouteMatch
//!
//! Route Compilation (at startup / on reload):
//!     RouteConfig[]
//!     → Register targets per prefix (weight = repeat count)
//!     → Sort prefixes by specificity
//!     → Freeze behind Arc as immutable table
//! ```
//!
//! # Design Decisions
//! - Tables are built once, immutable while serving
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always resolves to the same prefix

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, RoutingError, RoutingTable, Selected};
