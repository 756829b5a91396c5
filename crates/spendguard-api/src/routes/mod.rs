//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering (dashboard only; the other modules
//!   are pure JSON surfaces consumed by the dashboard renderer)

pub mod auth;
pub mod dashboard;
pub mod expenses;
pub mod transactions;

use spendguard_config::PaginationConfig;
use std::collections::HashMap;

/// Parse `page`/`limit` query parameters, falling back to the configured
/// default and capping the limit at the configured maximum
pub(crate) fn page_params(
    params: &HashMap<String, String>,
    config: &PaginationConfig,
) -> (usize, usize) {
    let page = params
        .get("page")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.default_limit)
        .clamp(1, config.max_limit);
    (page, limit)
}

// ==================== Tests ====================
