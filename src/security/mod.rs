//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved request:
//!     → auth_source.rs (first present cookie/header credential)
//!     → access_control.rs (credential → granted scope)
//!     → scope.rs (scope token is a prefix of the path?)
//!     → Pass to handler, or 401/403
//! ```
//!
//! # Design Decisions
//! - Extraction and scope checks only report; the gate rejects
//! - Fail closed: unknown credentials are rejected like missing ones
//! - No trust in client input

pub mod access_control;
pub mod auth_source;
pub mod scope;

pub use access_control::{Access, AccessDenied, AccessPolicy};
pub use auth_source::{extract_credential, AuthSource};
pub use scope::scope_allows;
