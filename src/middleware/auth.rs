use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::cookie::read_cookie;
use crate::auth::CurrentUser;
use crate::error::ApiError;

/// Session token from the session cookie, falling back to a Bearer header
/// for non-browser clients
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    read_cookie(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Placed in request extensions by `enforce_access` for authenticated routes
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))
    }
}
