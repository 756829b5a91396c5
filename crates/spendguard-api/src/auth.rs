//! Authentication boundary
//!
//! Callers present an opaque bearer token issued at register/login time.
//! The [`AuthedUser`] extractor resolves it before any handler body runs,
//! so unauthenticated requests never reach the core. The HTMX dashboard
//! cannot attach headers to sidebar navigation, so a session cookie with
//! identical semantics is accepted as a fallback.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::AppState;

/// Cookie carrying the session token for HTMX page requests
pub const SESSION_COOKIE: &str = "sg_token";

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthedUser {
    /// Resolved user id; every store query is scoped to it
    pub user_id: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract the session token from a `Cookie` header value
fn token_from_cookie_header(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(ApiError::Unauthorized)?;
        let user_id = state
            .store
            .resolve_token(&token)
            .ok_or(ApiError::Unauthorized)?;
        Ok(AuthedUser { user_id })
    }
}

/// Hex-encoded sha-256 digest used for stored passwords
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

// ==================== Tests ====================
