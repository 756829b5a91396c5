//! Expense routes - CRUD with filtering and pagination
//!
//! Every operation is scoped to the authenticated user; a record owned by
//! someone else is indistinguishable from a missing one (404 either way).
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{
    api_expense_create, api_expense_delete, api_expense_detail, api_expense_update,
    api_expenses_list,
};
