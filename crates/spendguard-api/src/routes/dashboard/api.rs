//! Dashboard API endpoints - JSON statistics and HTMX partials
//!
//! Endpoints:
//! - api_dashboard_stats: GET /api/dashboard/stats (full aggregate bundle)
//! - api_dashboard_recent: GET /api/dashboard/recent (merged activity)
//! - page_dashboard: GET /dashboard (full page, overview section)
//! - htmx_dashboard_section: GET /dashboard/section/:section
//! - htmx_transactions_page: GET /dashboard/transactions/list (pagination)
//! - htmx_expenses_page: GET /dashboard/expenses/list (pagination)

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use serde_json::json;
use std::collections::HashMap;

use spendguard_core::{ExpenseFilter, Pagination};

use super::page;
use super::page::{Section, UiState};
use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::routes::page_params;
use crate::{page_response, AppState};

/// How many recent records the stats bundle includes
const STATS_RECENT_LIMIT: usize = 5;

/// Get dashboard statistics (JSON API)
pub async fn api_dashboard_stats(
    state: State<AppState>,
    user: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = &state.store;
    let uid = &user.user_id;

    Ok(Json(json!({
        "success": true,
        "data": {
            "expenses": store.expense_totals(uid),
            "fraud": store.fraud_summary(uid),
            "categoryBreakdown": store.category_breakdown(uid),
            "monthlyTrends": store.monthly_trends(uid),
            "recentTransactions": store.recent_transactions(uid, STATS_RECENT_LIMIT),
            "recentExpenses": store.recent_expenses(uid, STATS_RECENT_LIMIT),
        }
    })))
}

/// Get the merged recent-activity list (JSON API)
pub async fn api_dashboard_recent(
    state: State<AppState>,
    user: AuthedUser,
    params: Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params
        .get("limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(10)
        .clamp(1, state.config.pagination.max_limit);
    let activity = state.store.recent_activity(&user.user_id, limit);
    Ok(Json(json!({ "success": true, "data": activity })))
}

// ==================== HTMX Dashboard ====================

fn overview_html(state: &AppState, user_id: &str) -> String {
    let store = &state.store;
    page::render_overview(
        &store.expense_totals(user_id),
        &store.fraud_summary(user_id),
        &store.category_breakdown(user_id),
        &store.monthly_trends(user_id),
        &store.recent_activity(user_id, page::RECENT_ACTIVITY_LIMIT),
    )
}

fn transactions_html(state: &AppState, user_id: &str, page_no: usize) -> String {
    let limit = state.config.pagination.default_limit;
    let (transactions, total) = state.store.transactions(user_id, page_no, limit);
    page::render_transactions_section(&transactions, &Pagination::new(page_no, limit, total))
}

fn expenses_html(state: &AppState, user_id: &str, page_no: usize) -> String {
    let limit = state.config.pagination.default_limit;
    let (expenses, total) =
        state
            .store
            .expenses(user_id, &ExpenseFilter::default(), page_no, limit);
    page::render_expenses_section(&expenses, &Pagination::new(page_no, limit, total))
}

/// Dashboard page; loads in the initial section (overview)
pub async fn page_dashboard(
    state: State<AppState>,
    user: AuthedUser,
    headers: HeaderMap,
) -> Html<String> {
    let ui = UiState::new(Section::initial());
    let content = overview_html(&state, &user.user_id);
    let shell = page::render_dashboard_shell(&ui, &content);
    Html(page_response(&headers, "Dashboard", &shell))
}

/// HTMX: one section partial per navigation transition.
/// Entering a section performs exactly one data fetch and one render.
pub async fn htmx_dashboard_section(
    state: State<AppState>,
    user: AuthedUser,
    Path(section): Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let section: Section = section.parse().map_err(|_| ApiError::NotFound {
        resource: "Section".to_string(),
    })?;
    let ui = UiState::from_query(section, &params);

    let html = match ui.section {
        Section::Overview => overview_html(&state, &user.user_id),
        Section::Transactions => transactions_html(&state, &user.user_id, ui.transactions_page),
        Section::Expenses => expenses_html(&state, &user.user_id, ui.expenses_page),
        Section::FraudAlerts => {
            page::render_fraud_alerts(&state.store.fraud_transactions(&user.user_id))
        }
    };

    Ok(Html(html))
}

/// HTMX: re-fetch one page of the transactions listing
pub async fn htmx_transactions_page(
    state: State<AppState>,
    user: AuthedUser,
    params: Query<HashMap<String, String>>,
) -> Html<String> {
    let (page_no, _) = page_params(&params, &state.config.pagination);
    Html(transactions_html(&state, &user.user_id, page_no))
}

/// HTMX: re-fetch one page of the expenses listing
pub async fn htmx_expenses_page(
    state: State<AppState>,
    user: AuthedUser,
    params: Query<HashMap<String, String>>,
) -> Html<String> {
    let (page_no, _) = page_params(&params, &state.config.pagination);
    Html(expenses_html(&state, &user.user_id, page_no))
}
