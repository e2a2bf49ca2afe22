//! Access gate.
//! Turns a credential into a scope and checks it against the request path.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::header::InvalidHeaderName;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::AuthConfig;
use crate::security::auth_source::{extract_credential, AuthSource};
use crate::security::scope::scope_allows;

/// Why the gate rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// No configured source carried a credential.
    #[error("missing credential")]
    MissingCredential,
    /// A credential was found but is not in the credential table.
    #[error("unknown credential")]
    UnknownCredential,
    /// The credential's scope does not cover the path.
    #[error("scope does not cover the requested path")]
    OutOfScope,
}

impl AccessDenied {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessDenied::MissingCredential | AccessDenied::UnknownCredential => {
                StatusCode::UNAUTHORIZED
            }
            AccessDenied::OutOfScope => StatusCode::FORBIDDEN,
        }
    }

    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDenied::MissingCredential => "missing_credential",
            AccessDenied::UnknownCredential => "unknown_credential",
            AccessDenied::OutOfScope => "out_of_scope",
        }
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status();
        response
    }
}

/// Result of a request the gate let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub credential: Option<String>,
    /// True when the scope check ran and passed.
    pub authorized: bool,
}

/// Compiled access configuration.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    enabled: bool,
    sources: Vec<AuthSource>,
    /// token → scope
    grants: HashMap<String, String>,
}

impl AccessPolicy {
    pub fn from_config(config: &AuthConfig) -> Result<Self, InvalidHeaderName> {
        let sources = config
            .sources
            .iter()
            .map(AuthSource::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let grants = config
            .credentials
            .iter()
            .map(|c| (c.token.clone(), c.scope.clone()))
            .collect();

        Ok(Self {
            enabled: config.enabled,
            sources,
            grants,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether a request for `path` may proceed.
    ///
    /// The credential is always extracted so handlers can see it; the scope
    /// check only applies when the gate is enabled and the route is not
    /// public.
    pub fn evaluate(
        &self,
        headers: &HeaderMap,
        path: &str,
        public: bool,
    ) -> Result<Access, AccessDenied> {
        let credential = extract_credential(&self.sources, headers);
        if !self.enabled || public {
            return Ok(Access {
                credential,
                authorized: false,
            });
        }

        let token = credential.ok_or(AccessDenied::MissingCredential)?;
        let scope = self
            .grants
            .get(&token)
            .ok_or(AccessDenied::UnknownCredential)?;

        if scope_allows(scope, path) {
            Ok(Access {
                credential: Some(token),
                authorized: true,
            })
        } else {
            Err(AccessDenied::OutOfScope)
        }
    }
}
