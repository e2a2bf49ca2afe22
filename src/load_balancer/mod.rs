//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → handler set identified (n ≥ 1)
//!     → LoadBalancer::pick(n) → index into the set
//!     → handler at that index serves the request
//! ```
//!
//! # Design Decisions
//! - Load balancer sees only the candidate count; the routing table owns handlers
//! - Uniform random selection: stateless, no contention between requests
//! - Duplicate registrations are separate candidates (weighting by repetition)

pub mod random;

pub use random::UniformRandom;

/// Trait for choosing one of several interchangeable handlers.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Returns an index in `0..candidates`, or `None` when there are none.
    fn pick(&self, candidates: usize) -> Option<usize>;
}
