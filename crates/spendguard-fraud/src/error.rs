//! Error types for spendguard-fraud

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FraudError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned status {status}")]
    Status { status: u16 },

    #[error("Invalid classifier response: {message}")]
    InvalidResponse { message: String },
}
