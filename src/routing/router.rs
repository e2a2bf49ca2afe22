//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store handlers per path prefix, in registration order
//! - Keep the prefix scan order (most specific first) in sync with the keys
//! - Resolve a path to its handler set and select one handler
//!
//! # Design Decisions
//! - Registration takes `&mut self`; once shared behind `Arc` the table is
//!   frozen and lookups need no lock
//! - O(1) exact lookup via HashMap, O(n) prefix scan otherwise
//! - Explicit NoRouteMatch rather than silent default

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::load_balancer::LoadBalancer;
use crate::routing::matcher::{by_specificity, matches_prefix};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("no route matches `{path}`")]
    NoRouteMatch { path: String },
}

/// Prefix routing table.
///
/// Every key owns at least one handler: a prefix only comes into existence
/// together with its first handler.
#[derive(Debug, Clone)]
pub struct RoutingTable<H> {
    routes: HashMap<String, Vec<H>>,
    /// Keys of `routes`, sorted by [`by_specificity`].
    prefixes: Vec<String>,
}

impl<H> Default for RoutingTable<H> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
            prefixes: Vec::new(),
        }
    }
}

impl<H> RoutingTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `prefix`.
    ///
    /// A known prefix gets the handler appended (no deduplication: the same
    /// handler added twice is twice as likely to be selected). A new prefix
    /// is inserted into the scan order.
    pub fn add(&mut self, prefix: impl Into<String>, handler: H) -> &mut Self {
        match self.routes.entry(prefix.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(handler),
            Entry::Vacant(entry) => {
                self.prefixes.push(entry.key().clone());
                self.prefixes.sort_by(|a, b| by_specificity(a, b));
                entry.insert(vec![handler]);
            }
        }
        self
    }

    /// Find the handler set serving `path`.
    ///
    /// An exact key wins outright; otherwise the first prefix in scan order
    /// that `path` starts with is used.
    pub fn resolve(&self, path: &str) -> Result<RouteMatch<'_, H>, RoutingError> {
        if let Some((prefix, handlers)) = self.routes.get_key_value(path) {
            return Ok(RouteMatch { prefix, handlers });
        }

        self.prefixes
            .iter()
            .find(|prefix| matches_prefix(prefix, path))
            .and_then(|prefix| {
                self.routes.get(prefix).map(|handlers| RouteMatch {
                    prefix: prefix.as_str(),
                    handlers,
                })
            })
            .ok_or_else(|| RoutingError::NoRouteMatch {
                path: path.to_string(),
            })
    }

    /// Resolve `path` and pick one handler from its set.
    pub fn route(
        &self,
        path: &str,
        balancer: &dyn LoadBalancer,
    ) -> Result<Selected<'_, H>, RoutingError> {
        self.resolve(path).map(|m| m.select(balancer))
    }

    /// Registered prefixes in scan order.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Handlers registered under exactly `prefix`.
    pub fn handlers(&self, prefix: &str) -> Option<&[H]> {
        self.routes.get(prefix).map(Vec::as_slice)
    }

    /// Number of distinct prefixes.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// A resolved prefix and its (non-empty) handler set.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    prefix: &'a str,
    handlers: &'a [H],
}

impl<'a, H> RouteMatch<'a, H> {
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn handlers(&self) -> &'a [H] {
        self.handlers
    }

    /// Pick one handler using `balancer`.
    pub fn select(&self, balancer: &dyn LoadBalancer) -> Selected<'a, H> {
        let len = self.handlers.len();
        let index = balancer
            .pick(len)
            .filter(|i| *i < len)
            .unwrap_or(0);
        Selected {
            prefix: self.prefix,
            index,
            handler: &self.handlers[index],
        }
    }
}

/// The handler chosen for a request.
#[derive(Debug)]
pub struct Selected<'a, H> {
    pub prefix: &'a str,
    /// Position of the handler within its route.
    pub index: usize,
    pub handler: &'a H,
}
