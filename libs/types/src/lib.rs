//! Types library for the custodial bank ledger
//!
//! This library provides the core type definitions shared by the bank
//! contract and any tooling that builds or signs requests for it, so both
//! sides agree byte-for-byte on identifiers, amounts and signed messages.
//!
//! # Version
//! v1.0.0 - Protocol version 1
//!
//! # Modules
//! - `ids`: Identifiers (Address, AssetId, TriggerId, Nonce)
//! - `amount`: Requested amounts, including the `"all"` sentinel
//! - `payment`: Payment requests and the messages of a response unit
//! - `message`: Canonical signing templates for delegated calls
//! - `trigger`: Incoming trigger and outgoing response envelopes
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod amount;
pub mod payment;
pub mod message;
pub mod trigger;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::amount::*;
    pub use crate::payment::*;
    pub use crate::message::*;
    pub use crate::trigger::*;
    pub use crate::errors::*;
}
