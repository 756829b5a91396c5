//! HTTP API server with HTMX dashboard
//!
//! Routes are organized into modules:
//! - routes::auth: Register/login, token issuance
//! - routes::expenses: Expense CRUD with filtering and pagination
//! - routes::transactions: Transaction create (with fraud check) and lists
//! - routes::dashboard: Aggregated statistics API and the HTMX dashboard

pub mod auth;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use spendguard_config::Config;
use spendguard_core::Store;
use spendguard_fraud::FraudClassifier;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use auth::AuthedUser;
pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub classifier: Arc<dyn FraudClassifier>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::auth::{api_login, api_register};
    use routes::dashboard::{
        api_dashboard_recent, api_dashboard_stats, htmx_dashboard_section, htmx_expenses_page,
        htmx_transactions_page, page_dashboard,
    };
    use routes::expenses::{
        api_expense_create, api_expense_delete, api_expense_detail, api_expense_update,
        api_expenses_list,
    };
    use routes::transactions::{
        api_fraud_transactions, api_transaction_create, api_transactions_list,
    };

    Router::new()
        // JSON API endpoints
        .route("/api/health", get(health_check))
        .route("/api/auth/register", post(api_register))
        .route("/api/auth/login", post(api_login))
        .route("/api/expenses", post(api_expense_create).get(api_expenses_list))
        .route(
            "/api/expenses/:id",
            get(api_expense_detail)
                .put(api_expense_update)
                .delete(api_expense_delete),
        )
        .route(
            "/api/transactions",
            post(api_transaction_create).get(api_transactions_list),
        )
        .route("/api/transactions/fraud", get(api_fraud_transactions))
        .route("/api/dashboard/stats", get(api_dashboard_stats))
        .route("/api/dashboard/recent", get(api_dashboard_recent))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        // HTMX partial routes (section content and per-listing pagination)
        .route("/dashboard/section/:section", get(htmx_dashboard_section))
        .route("/dashboard/transactions/list", get(htmx_transactions_page))
        .route("/dashboard/expenses/list", get(htmx_expenses_page))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Spendguard</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(title, inner_content)
    }
}

/// Start the HTTP server
///
/// Creates the router, binds to the configured address, and serves until
/// the process exits. Each request is handled independently; the only
/// shared state is the store behind `AppState`.
pub async fn start_server(
    config: Config,
    store: Arc<Store>,
    classifier: Arc<dyn FraudClassifier>,
) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        store,
        classifier,
        config,
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.unwrap();
    log::info!(target: "spendguard::api", "Starting spendguard server on http://{}", addr);
    log::info!(target: "spendguard::api", "Available routes:");
    log::info!(target: "spendguard::api", "  - / (Dashboard)");
    log::info!(target: "spendguard::api", "  - /api/auth/* (Register, login)");
    log::info!(target: "spendguard::api", "  - /api/expenses (Expense CRUD)");
    log::info!(target: "spendguard::api", "  - /api/transactions (Transactions, fraud list)");
    log::info!(target: "spendguard::api", "  - /api/dashboard/* (Aggregated statistics)");

    match axum::serve(listener, router).await {
        Ok(_) => log::info!(target: "spendguard::api", "Server stopped gracefully"),
        Err(e) => log::error!(target: "spendguard::api", "Server error: {}", e),
    }
}
