//! Scope-based authorization.
//!
//! A scope is a space-delimited list of path namespaces. A token grants every
//! URI that starts with it, so `/routes` covers `/routes/123`. Matching is
//! case-sensitive and trailing slashes are not normalized.

/// Returns true if any token of `scope` is a literal prefix of `uri`.
///
/// Empty tokens (from an empty scope or doubled spaces) grant nothing.
pub fn scope_allows(scope: &str, uri: &str) -> bool {
    scope
        .split(' ')
        .filter(|token| !token.is_empty())
        .any(|token| uri.starts_with(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_grants() {
        let scope = "/routes /users";
        assert!(scope_allows(scope, "/routes/42"));
        assert!(scope_allows(scope, "/users"));
        assert!(!scope_allows(scope, "/admin"));
    }

    #[test]
    fn test_empty_scope_grants_nothing() {
        assert!(!scope_allows("", "/"));
        assert!(!scope_allows("", ""));
        assert!(!scope_allows("   ", "/anything"));
    }

    #[test]
    fn test_extra_spaces_ignored() {
        assert!(scope_allows("  /a   /b ", "/b/c"));
        assert!(!scope_allows("  /a   /b ", "/c"));
    }

    #[test]
    fn test_case_and_slash_sensitive() {
        assert!(!scope_allows("/Routes", "/routes"));
        assert!(!scope_allows("/routes/", "/routes"));
        assert!(scope_allows("/routes", "/routesfoo"));
    }
}
