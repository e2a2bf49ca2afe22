//! Prefix matching rules.
//!
//! # Design Decisions
//! - Path matching is case-sensitive and literal (no normalization)
//! - Longer prefixes are tested first; equal lengths fall back to
//!   descending lexicographic order so the scan order is total and stable
//! - No regex to guarantee O(n) matching

use std::cmp::Ordering;

/// Scan order for registered prefixes: length descending, then
/// lexicographically greater first.
pub fn by_specificity(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| b.cmp(a))
}

/// Returns true if `prefix` is a literal string prefix of `path`.
#[inline]
pub fn matches_prefix(prefix: &str, path: &str) -> bool {
    path.starts_with(prefix)
}
