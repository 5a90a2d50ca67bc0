//! Custodial ledger contract
//!
//! Holds deposits of several assets on behalf of accounts and lets an owner,
//! or a third party holding a key the owner authorized, withdraw, transfer or
//! fan out payments. Every call arrives as one atomic trigger that either
//! commits in full or bounces with an error.
//!
//! # Modules
//! - `errors`: Contract error taxonomy and bounce messages
//! - `config`: Per-instance configuration (fee, limits)
//! - `store`: Ledger state interface and the in-memory store
//! - `overlay`: Speculative writes, committed only on success
//! - `balances`: Checked credit/debit and `"all"` resolution
//! - `keys`: Key authorization registry
//! - `verifier`: Delegated-call signature and nonce checks
//! - `router`: Splitting payments into direct and buffered ones
//! - `request`: Strict trigger classification
//! - `events`: Committed-state events
//! - `bank`: The dispatcher tying it all together
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod config;
pub mod store;
pub mod overlay;
pub mod balances;
pub mod keys;
pub mod verifier;
pub mod router;
pub mod request;
pub mod events;
pub mod bank;

pub use bank::Bank;
pub use config::BankConfig;
pub use errors::BankError;

/// Contract ABI version (frozen after release)
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
