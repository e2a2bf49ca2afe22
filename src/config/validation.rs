//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, statuses, weights 1..=MAX_WEIGHT)
//! - Check header names/values and auth sources before they reach the router
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, StatusCode};

use crate::config::schema::{AuthSourceKind, GatewayConfig, HeaderConfig, TargetKind};

/// Upper bound on a target's weight. Each unit is one registered handler.
pub const MAX_WEIGHT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),
    #[error("request timeout must be greater than zero")]
    RequestTimeout,
    #[error("route prefix `{0}` must start with `/`")]
    Prefix(String),
    #[error("route `{0}` has no targets")]
    NoTargets(String),
    #[error("route `{0}` has a target with weight 0")]
    ZeroWeight(String),
    #[error("route `{prefix}` has a target with weight {weight}, above the limit of {max}", max = MAX_WEIGHT)]
    WeightTooLarge { prefix: String, weight: u32 },
    #[error("route `{prefix}` has invalid status {status}")]
    Status { prefix: String, status: u16 },
    #[error("route `{0}` has an invalid redirect location")]
    Location(String),
    #[error("invalid header `{0}`")]
    Header(String),
    #[error("route `{0}` is declared both public and protected")]
    ConflictingPublic(String),
    #[error("auth is enabled but no credential sources are configured")]
    NoAuthSources,
    #[error("auth source has an invalid name `{0}`")]
    AuthSource(String),
    #[error("credential token must not be empty")]
    EmptyToken,
    #[error("duplicate credential token")]
    DuplicateToken,
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let mut visibility: HashMap<&str, bool> = HashMap::new();
    for route in &config.routes {
        let public = *visibility.entry(route.prefix.as_str()).or_insert(route.public);
        if public != route.public {
            errors.push(ValidationError::ConflictingPublic(route.prefix.clone()));
        }
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::Prefix(route.prefix.clone()));
        }
        if route.targets.is_empty() {
            errors.push(ValidationError::NoTargets(route.prefix.clone()));
        }
        for target in &route.targets {
            if target.weight == 0 {
                errors.push(ValidationError::ZeroWeight(route.prefix.clone()));
            } else if target.weight > MAX_WEIGHT {
                errors.push(ValidationError::WeightTooLarge {
                    prefix: route.prefix.clone(),
                    weight: target.weight,
                });
            }
            validate_target(&route.prefix, &target.kind, &mut errors);
        }
    }

    validate_headers(&config.security.response_headers, &mut errors);

    let auth = &config.auth;
    if auth.enabled && auth.sources.is_empty() {
        errors.push(ValidationError::NoAuthSources);
    }
    for source in &auth.sources {
        let valid = match source.kind {
            AuthSourceKind::Cookie => !source.name.is_empty(),
            AuthSourceKind::Header => HeaderName::from_bytes(source.name.as_bytes()).is_ok(),
        };
        if !valid {
            errors.push(ValidationError::AuthSource(source.name.clone()));
        }
    }

    let mut tokens = HashSet::new();
    for credential in &auth.credentials {
        if credential.token.is_empty() {
            errors.push(ValidationError::EmptyToken);
        } else if !tokens.insert(credential.token.as_str()) {
            errors.push(ValidationError::DuplicateToken);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_target(prefix: &str, kind: &TargetKind, errors: &mut Vec<ValidationError>) {
    match kind {
        TargetKind::Static {
            status, headers, ..
        } => {
            if StatusCode::from_u16(*status).is_err() {
                errors.push(ValidationError::Status {
                    prefix: prefix.to_string(),
                    status: *status,
                });
            }
            validate_headers(headers, errors);
        }
        TargetKind::Redirect { location, status } => {
            if !(300..400).contains(status) {
                errors.push(ValidationError::Status {
                    prefix: prefix.to_string(),
                    status: *status,
                });
            }
            if location.is_empty() || HeaderValue::from_str(location).is_err() {
                errors.push(ValidationError::Location(prefix.to_string()));
            }
        }
        TargetKind::Echo | TargetKind::WebsocketEcho => {}
    }
}

fn validate_headers(headers: &[HeaderConfig], errors: &mut Vec<ValidationError>) {
    for header in headers {
        if HeaderName::from_bytes(header.name.as_bytes()).is_err()
            || HeaderValue::from_str(&header.value).is_err()
        {
            errors.push(ValidationError::Header(header.name.clone()));
        }
    }
}
