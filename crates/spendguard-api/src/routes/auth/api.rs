//! Auth API endpoints
//!
//! Endpoints:
//! - api_register: Create an account, returns {user, token}
//! - api_login: Verify credentials, returns {user, token}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use spendguard_core::{CoreError, FieldError, User};

use crate::auth::password_digest;
use crate::error::ApiError;
use crate::AppState;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The user view returned to clients (no digest)
fn public_user(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "createdAt": user.created_at,
    })
}

fn validate_register(payload: &RegisterPayload) -> Result<(String, String, String), CoreError> {
    let mut errors = Vec::new();

    let name = payload.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Please provide a name"));
    }

    let email = payload.email.as_deref().unwrap_or("").trim().to_string();
    if email.is_empty() || !email.contains('@') {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }

    let password = payload.password.as_deref().unwrap_or("").to_string();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if errors.is_empty() {
        Ok((name, email, password))
    } else {
        Err(CoreError::Validation { errors })
    }
}

/// Register a new account
pub async fn api_register(
    state: State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (name, email, password) = validate_register(&payload)?;
    let user = state
        .store
        .create_user(&name, &email, &password_digest(&password))?;
    let token = state.store.issue_token(&user.id);

    log::info!(target: "spendguard::api", "Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "user": public_user(&user), "token": token }
        })),
    ))
}

/// Log in with email and password
pub async fn api_login(
    state: State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = payload.email.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let user = state.store.authenticate(email, &password_digest(password))?;
    let token = state.store.issue_token(&user.id);

    Ok(Json(json!({
        "success": true,
        "data": { "user": public_user(&user), "token": token }
    })))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_register_collects_errors() {
        let payload = RegisterPayload {
            name: Some("  ".to_string()),
            email: Some("not-an-email".to_string()),
            password: Some("123".to_string()),
        };
        match validate_register(&payload) {
            Err(CoreError::Validation { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_register_accepts_valid_payload() {
        let payload = RegisterPayload {
            name: Some("Asha".to_string()),
            email: Some("asha@example.com".to_string()),
            password: Some("secret123".to_string()),
        };
        let (name, email, _) = validate_register(&payload).unwrap();
        assert_eq!(name, "Asha");
        assert_eq!(email, "asha@example.com");
    }

    #[test]
    fn test_public_user_omits_digest() {
        let user = User {
            id: "u-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_digest: "deadbeef".to_string(),
            created_at: chrono::Utc::now(),
        };
        let value = public_user(&user);
        assert!(value.get("passwordDigest").is_none());
        assert_eq!(value["email"], "asha@example.com");
    }
}
