//! Error types for ledger identifiers and values
//!
//! Raised while turning untrusted trigger data into typed values.

use thiserror::Error;

/// Malformed identifier or value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid nonce: {0}")]
    InvalidNonce(String),
}
