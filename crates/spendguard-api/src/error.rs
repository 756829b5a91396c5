//! Error types for spendguard-api
//!
//! Every error response uses the `{"success": false, ...}` envelope.
//! Validation failures carry field-level detail; everything unexpected
//! collapses into a generic 500 without leaking internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use spendguard_core::{CoreError, FieldError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal server error")]
    InternalError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": format!("{} not found", resource) }),
            ),
            ApiError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "errors": errors }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Not authorized to access this route" }),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Invalid credentials" }),
            ),
            ApiError::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({ "success": false, "message": message }),
            ),
            ApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "message": "Server error" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::RecordNotFound { kind } => ApiError::NotFound {
                resource: kind.to_string(),
            },
            CoreError::Validation { errors } => ApiError::Validation { errors },
            CoreError::DuplicateEntry { .. } => ApiError::Conflict {
                message: "Email already registered".to_string(),
            },
            CoreError::InvalidCredentials => ApiError::InvalidCredentials,
            CoreError::IoError => {
                log::error!(target: "spendguard::api", "Store IO failure");
                ApiError::InternalError
            }
            CoreError::InternalError { message } => {
                log::error!(target: "spendguard::api", "Internal error: {}", message);
                ApiError::InternalError
            }
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_from_core() {
        let api: ApiError = CoreError::RecordNotFound { kind: "Expense" }.into();
        assert!(matches!(api, ApiError::NotFound { ref resource } if resource == "Expense"));
    }

    #[test]
    fn test_validation_detail_survives_mapping() {
        let core = CoreError::invalid_field("amount", "Amount must be a positive number");
        let api: ApiError = core.into();
        match api {
            ApiError::Validation { errors } => assert_eq!(errors[0].field, "amount"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
