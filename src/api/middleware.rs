/// Bearer-token extraction and request guards
use crate::{
    auth::{guard, AccessRequirement, Claims},
    context::AppContext,
    error::{PortalError, PortalResult},
};
use axum::http::HeaderMap;

/// Extract the bearer token from the Authorization header.
///
/// Accepts both `Bearer <token>` and a bare token value; older portal
/// clients send the token without the scheme prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).to_string())
        .filter(|s| !s.is_empty())
}

/// Require a valid token; returns the caller's claims.
///
/// Token verification is a pure in-memory computation: no I/O happens
/// here.
pub fn require_auth(ctx: &AppContext, headers: &HeaderMap) -> PortalResult<Claims> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| PortalError::Authentication("Missing authorization header".to_string()))?;

    guard::authorize(&ctx.tokens, &token, AccessRequirement::Authenticated)
}

/// Require a valid token carrying the admin role
pub fn require_admin(ctx: &AppContext, headers: &HeaderMap) -> PortalResult<Claims> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| PortalError::Authentication("Missing authorization header".to_string()))?;

    guard::authorize(&ctx.tokens, &token, AccessRequirement::Elevated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_bare_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("abc123"));
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_missing_or_empty_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static(""));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
