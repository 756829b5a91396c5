//! Transaction routes - create with fraud screening, lists
//!
//! Transactions are append-only: there are no update or delete endpoints.
//! Creation forwards the attributes to the fraud classifier and stores the
//! verdict alongside the record; an unreachable classifier degrades to the
//! safe default verdict instead of failing the request.
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{api_fraud_transactions, api_transaction_create, api_transactions_list};
