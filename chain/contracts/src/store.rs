//! Ledger state store
//!
//! The bank never touches ambient state: every read and write goes through a
//! [`LedgerStore`] passed in explicitly. [`MemoryStore`] keeps state the way
//! external readers observe it, as flat key/value pairs:
//!
//! - `balance_<account>_<asset>` → amount (zero is stored, not removed)
//! - `key_<owner>_<keyHash>` → 1 while authorized, absent after revoke
//! - `nonce_<keyHash>_<nonce>` → 1 once consumed, never removed

use bank_types::ids::{Address, AssetId, Nonce};
use std::collections::BTreeMap;

use crate::keys::KeyHash;

/// Storage interface for balances, authorized keys and consumed nonces.
///
/// Balances are plain setters here; the overdraft and overflow rules live in
/// [`crate::balances`].
pub trait LedgerStore {
    /// Current balance, 0 when absent.
    fn balance(&self, account: &Address, asset: &AssetId) -> u64;

    fn set_balance(&mut self, account: &Address, asset: &AssetId, amount: u64);

    fn is_key_authorized(&self, owner: &Address, key_hash: &KeyHash) -> bool;

    /// `false` removes the entry.
    fn set_key_authorized(&mut self, owner: &Address, key_hash: &KeyHash, authorized: bool);

    fn is_nonce_used(&self, key_hash: &KeyHash, nonce: &Nonce) -> bool;

    fn mark_nonce_used(&mut self, key_hash: &KeyHash, nonce: &Nonce);
}

/// State variable name of a balance
pub fn balance_var(account: &Address, asset: &AssetId) -> String {
    format!("balance_{}_{}", account, asset)
}

/// State variable name of an authorized key
pub fn key_var(owner: &Address, key_hash: &KeyHash) -> String {
    format!("key_{}_{}", owner, key_hash)
}

/// State variable name of a consumed nonce
pub fn nonce_var(key_hash: &KeyHash, nonce: &Nonce) -> String {
    format!("nonce_{}_{}", key_hash, nonce)
}

/// In-memory store keyed by state variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    vars: BTreeMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted state variables
    pub fn state_vars(&self) -> &BTreeMap<String, u64> {
        &self.vars
    }

    /// Look up one state variable by name
    pub fn var(&self, name: &str) -> Option<u64> {
        self.vars.get(name).copied()
    }
}

impl LedgerStore for MemoryStore {
    fn balance(&self, account: &Address, asset: &AssetId) -> u64 {
        self.var(&balance_var(account, asset)).unwrap_or(0)
    }

    fn set_balance(&mut self, account: &Address, asset: &AssetId, amount: u64) {
        self.vars.insert(balance_var(account, asset), amount);
    }

    fn is_key_authorized(&self, owner: &Address, key_hash: &KeyHash) -> bool {
        self.vars.contains_key(&key_var(owner, key_hash))
    }

    fn set_key_authorized(&mut self, owner: &Address, key_hash: &KeyHash, authorized: bool) {
        let name = key_var(owner, key_hash);
        if authorized {
            self.vars.insert(name, 1);
        } else {
            self.vars.remove(&name);
        }
    }

    fn is_nonce_used(&self, key_hash: &KeyHash, nonce: &Nonce) -> bool {
        self.vars.contains_key(&nonce_var(key_hash, nonce))
    }

    fn mark_nonce_used(&mut self, key_hash: &KeyHash, nonce: &Nonce) {
        self.vars.insert(nonce_var(key_hash, nonce), 1);
    }
}
