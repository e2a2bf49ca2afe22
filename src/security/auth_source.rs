//! Credential extraction from cookies and headers.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderName};

use crate::config::{AuthSourceConfig, AuthSourceKind};

/// A compiled credential source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSource {
    /// Present if a cookie with exactly this name exists.
    Cookie(String),
    /// Present if the header's first value is non-empty.
    Header(HeaderName),
}

impl TryFrom<&AuthSourceConfig> for AuthSource {
    type Error = axum::http::header::InvalidHeaderName;

    fn try_from(config: &AuthSourceConfig) -> Result<Self, Self::Error> {
        Ok(match config.kind {
            AuthSourceKind::Cookie => AuthSource::Cookie(config.name.clone()),
            AuthSourceKind::Header => {
                AuthSource::Header(HeaderName::from_bytes(config.name.as_bytes())?)
            }
        })
    }
}

impl AuthSource {
    fn read(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            AuthSource::Cookie(name) => cookie_value(headers, name),
            AuthSource::Header(name) => headers
                .get(name)
                .filter(|v| !v.as_bytes().is_empty())
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
        }
    }
}

/// Return the credential from the first source that is present.
///
/// Sources are tried strictly in order and the first hit wins. `None` means
/// the request is unauthenticated; rejecting it is up to the caller.
pub fn extract_credential(sources: &[AuthSource], headers: &HeaderMap) -> Option<String> {
    sources.iter().find_map(|source| source.read(headers))
}

/// Value of the cookie called `name`, searching every `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|raw| raw.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| unquote(value.trim()).to_string())
        })
}

/// Strip one matched pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
