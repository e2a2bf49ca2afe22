//! Response handling.
//!
//! # Responsibilities
//! - Replicate header sets onto responses (multi-valued, additive)
//! - Build the not-found terminal response
//!
//! # Design Decisions
//! - Header copies append and never overwrite existing values
//! - Not-found carries no body

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

/// Append every value of every header in `src` to `dst`, in order.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src.iter() {
        dst.append(name.clone(), value.clone());
    }
}

/// 404 with an empty body.
pub fn not_found() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_copy_keeps_all_values_in_order() {
        let mut src = HeaderMap::new();
        src.append("set-cookie", HeaderValue::from_static("a=1"));
        src.append("set-cookie", HeaderValue::from_static("b=2"));
        src.insert("x-backend", HeaderValue::from_static("b1"));

        let mut dst = HeaderMap::new();
        copy_headers(&mut dst, &src);

        let cookies: Vec<_> = dst.get_all("set-cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
        assert_eq!(dst.get("x-backend").unwrap(), "b1");
    }

    #[test]
    fn test_copy_is_additive() {
        let mut dst = HeaderMap::new();
        dst.insert("vary", HeaderValue::from_static("accept"));

        let mut src = HeaderMap::new();
        src.insert("vary", HeaderValue::from_static("origin"));
        copy_headers(&mut dst, &src);

        let values: Vec<_> = dst.get_all("vary").iter().collect();
        assert_eq!(values, ["accept", "origin"]);
    }

    #[test]
    fn test_not_found_has_no_body() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().is_empty());
    }
}
