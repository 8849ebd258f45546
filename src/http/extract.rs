//! Request Guards
//!
//! Bearer-token authentication and role gates, applied inside handlers
//! rather than as tower layers so each route names its own policy.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::auth::{AuthError, AuthService, InMemoryUserRepository, Role, User};
use crate::observability::{log_event, Event};

use super::error::ApiError;

/// Pull the raw token out of an `Authorization: Bearer ..` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::NotLoggedIn)?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::NotLoggedIn.into())
}

/// Resolve the request to a logged-in user or reject it.
pub fn protect(
    auth: &AuthService<InMemoryUserRepository>,
    headers: &HeaderMap,
) -> Result<User, ApiError> {
    let resolved = bearer_token(headers)
        .and_then(|token| auth.authenticate(token).map_err(ApiError::from));

    if let Err(err) = &resolved {
        log_event(Event::AuthRejected, &[("reason", &err.to_string())]);
    }
    resolved
}

/// Reject users whose role is not in the allowed list.
pub fn restrict_to(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    AuthService::<InMemoryUserRepository>::require_role(user, allowed)?;
    Ok(())
}
