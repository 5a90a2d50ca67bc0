//! Contract-specific error types
//!
//! Every variant is terminal for the current trigger: the trigger bounces and
//! its `Display` text becomes the bounce message. The texts are part of the
//! protocol and must not change.

use bank_types::errors::TypeError;
use thiserror::Error;

/// Bank errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// Malformed or missing field, contradictory selectors
    #[error("{0}")]
    Validation(String),

    #[error("trying to withdraw more than you have: {required} > {available}")]
    InsufficientBalance { required: u64, available: u64 },

    /// The base balance cannot cover the withdrawal fee
    #[error("not enough balance in base")]
    NotEnoughBase,

    #[error("this key is not authorized to sign for this owner")]
    KeyNotAuthorized,

    #[error("this nonce was already used")]
    NonceReused,

    #[error("invalid signature")]
    BadSignature,

    /// Someone other than the owner tried to manage the owner's keys
    #[error("only the owner can manage its keys")]
    Unauthorized,

    #[error("balance overflow")]
    Overflow,
}

impl BankError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BankError::Validation(msg.into())
    }
}

impl From<TypeError> for BankError {
    fn from(err: TypeError) -> Self {
        BankError::Validation(err.to_string())
    }
}
