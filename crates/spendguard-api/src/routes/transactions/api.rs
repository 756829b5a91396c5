//! Transaction API endpoints
//!
//! Endpoints:
//! - api_transaction_create: POST /api/transactions (runs the fraud check)
//! - api_transactions_list: GET /api/transactions (pagination)
//! - api_fraud_transactions: GET /api/transactions/fraud

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use std::collections::HashMap;

use spendguard_core::{FraudVerdict, Pagination, TransactionDraft};
use spendguard_fraud::{classify_or_default, TransactionAttributes};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::routes::page_params;
use crate::AppState;

/// Create a transaction, screening it through the fraud classifier first.
///
/// This is the one cross-component suspension point in the request path:
/// the handler awaits the classifier (or its timeout), then persists. The
/// classifier result never fails the request.
pub async fn api_transaction_create(
    state: State<AppState>,
    user: AuthedUser,
    Json(draft): Json<TransactionDraft>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let input = draft.validate()?;

    let verdict = if state.config.fraud.enable {
        let attributes = TransactionAttributes {
            amount: input.amount,
            location: input.location.clone(),
            time: input.time,
            description: input.description.clone(),
        };
        classify_or_default(state.classifier.as_ref(), &attributes).await
    } else {
        FraudVerdict::safe_default()
    };

    let fraud_alert = verdict.is_fraud;
    let transaction = state
        .store
        .create_transaction(&user.user_id, input, verdict)?;

    if fraud_alert {
        log::warn!(
            target: "spendguard::api",
            "Transaction {} flagged as fraud (confidence {:.2})",
            transaction.id,
            transaction.fraud_result.confidence
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "transaction": transaction, "fraudAlert": fraud_alert }
        })),
    ))
}

/// List transactions with pagination, newest first
pub async fn api_transactions_list(
    state: State<AppState>,
    user: AuthedUser,
    params: Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (page, limit) = page_params(&params, &state.config.pagination);
    let (transactions, total) = state.store.transactions(&user.user_id, page, limit);

    Ok(Json(json!({
        "success": true,
        "data": {
            "transactions": transactions,
            "pagination": Pagination::new(page, limit, total),
        }
    })))
}

/// List the user's flagged transactions, newest first
pub async fn api_fraud_transactions(
    state: State<AppState>,
    user: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let flagged = state.store.fraud_transactions(&user.user_id);
    Ok(Json(json!({ "success": true, "data": flagged })))
}
