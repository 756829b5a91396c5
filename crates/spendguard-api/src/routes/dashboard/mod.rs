//! Dashboard routes - aggregated statistics and the HTMX dashboard
//!
//! The JSON endpoints expose the aggregation engine; the page endpoints
//! render the dashboard widgets server-side and swap them in via HTMX.
//! Section navigation is the small state machine in [`page::Section`]:
//! entering a section triggers exactly one data fetch + render.
//!
//! Structure:
//! - api.rs: JSON API and HTMX section endpoints
//! - page.rs: Widget rendering and UI state

pub mod api;
pub mod page;

pub use api::{
    api_dashboard_recent, api_dashboard_stats, htmx_dashboard_section, htmx_expenses_page,
    htmx_transactions_page, page_dashboard,
};
pub use page::{Section, UiState};
