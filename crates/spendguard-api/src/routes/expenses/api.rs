//! Expense API endpoints
//!
//! Endpoints:
//! - api_expense_create: POST /api/expenses
//! - api_expenses_list: GET /api/expenses (category/date filters, pagination)
//! - api_expense_detail: GET /api/expenses/:id
//! - api_expense_update: PUT /api/expenses/:id
//! - api_expense_delete: DELETE /api/expenses/:id

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::collections::HashMap;

use spendguard_core::{Category, ExpenseDraft, ExpenseFilter, ExpenseUpdateDraft, Pagination};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::routes::page_params;
use crate::AppState;

/// Parse a date query parameter: RFC 3339, or a plain YYYY-MM-DD which
/// snaps to the start (or end) of that day
fn parse_date_param(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(DateTime::from_naive_utc_and_offset(time, Utc))
}

fn filter_from_params(params: &HashMap<String, String>) -> Result<ExpenseFilter, ApiError> {
    let mut filter = ExpenseFilter::default();

    if let Some(label) = params.get("category").filter(|s| !s.is_empty()) {
        let category: Category = label.parse().map_err(|_| ApiError::BadRequest {
            message: format!("Unknown category: {}", label),
        })?;
        filter.category = Some(category);
    }

    if let Some(raw) = params.get("startDate").filter(|s| !s.is_empty()) {
        filter.start_date = Some(parse_date_param(raw, false).ok_or(ApiError::BadRequest {
            message: "Invalid startDate".to_string(),
        })?);
    }

    if let Some(raw) = params.get("endDate").filter(|s| !s.is_empty()) {
        filter.end_date = Some(parse_date_param(raw, true).ok_or(ApiError::BadRequest {
            message: "Invalid endDate".to_string(),
        })?);
    }

    Ok(filter)
}

/// Create a new expense
pub async fn api_expense_create(
    state: State<AppState>,
    user: AuthedUser,
    Json(draft): Json<ExpenseDraft>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let input = draft.validate()?;
    let expense = state.store.create_expense(&user.user_id, input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": expense })),
    ))
}

/// List expenses with filtering, pagination, and the category summary
pub async fn api_expenses_list(
    state: State<AppState>,
    user: AuthedUser,
    params: Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = filter_from_params(&params)?;
    let (page, limit) = page_params(&params, &state.config.pagination);

    let (expenses, total) = state.store.expenses(&user.user_id, &filter, page, limit);
    let category_summary = state.store.category_breakdown(&user.user_id);

    Ok(Json(json!({
        "success": true,
        "data": {
            "expenses": expenses,
            "categorySummary": category_summary,
            "pagination": Pagination::new(page, limit, total),
        }
    })))
}

/// Get a single expense
pub async fn api_expense_detail(
    state: State<AppState>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let expense = state.store.expense(&user.user_id, &id)?;
    Ok(Json(json!({ "success": true, "data": expense })))
}

/// Update an expense
pub async fn api_expense_update(
    state: State<AppState>,
    user: AuthedUser,
    Path(id): Path<String>,
    Json(draft): Json<ExpenseUpdateDraft>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patch = draft.validate()?;
    let expense = state.store.update_expense(&user.user_id, &id, patch)?;
    Ok(Json(json!({ "success": true, "data": expense })))
}

/// Delete an expense
pub async fn api_expense_delete(
    state: State<AppState>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_expense(&user.user_id, &id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Expense deleted successfully"
    })))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_date_param_rfc3339() {
        let parsed = parse_date_param("2026-03-05T10:30:00Z", false).unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn test_parse_date_param_plain_date_snaps() {
        let start = parse_date_param("2026-03-05", false).unwrap();
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));

        let end = parse_date_param("2026-03-05", true).unwrap();
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert!(parse_date_param("05/03/2026", false).is_none());
    }

    #[test]
    fn test_filter_rejects_unknown_category() {
        let mut params = HashMap::new();
        params.insert("category".to_string(), "Groceries".to_string());
        assert!(filter_from_params(&params).is_err());
    }

    #[test]
    fn test_filter_accepts_known_category_and_range() {
        let mut params = HashMap::new();
        params.insert("category".to_string(), "Food".to_string());
        params.insert("startDate".to_string(), "2026-01-01".to_string());
        params.insert("endDate".to_string(), "2026-01-31".to_string());
        let filter = filter_from_params(&params).unwrap();
        assert_eq!(filter.category, Some(Category::Food));
        assert!(filter.start_date.unwrap() < filter.end_date.unwrap());
    }
}
