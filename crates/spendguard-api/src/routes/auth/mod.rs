//! Auth routes - register and login
//!
//! Issues the opaque session tokens the rest of the API is gated on.
//! Passwords are stored as sha-256 digests; tokens are uuids resolved by
//! the `AuthedUser` extractor.

pub mod api;

pub use api::{api_login, api_register};
