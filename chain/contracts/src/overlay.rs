//! Speculative writes for one trigger
//!
//! A trigger either commits fully or bounces with no effect. All of its
//! writes are buffered in an [`Overlay`] that reads through to the
//! underlying store; [`Overlay::commit`] applies them in one step, and
//! dropping the overlay discards them.

use bank_types::ids::{Address, AssetId, Nonce};
use std::collections::{BTreeMap, BTreeSet};

use crate::keys::KeyHash;
use crate::store::LedgerStore;

/// Write buffer over a borrowed store
pub struct Overlay<'a, S: LedgerStore + ?Sized> {
    base: &'a mut S,
    balances: BTreeMap<(Address, AssetId), u64>,
    keys: BTreeMap<(Address, KeyHash), bool>,
    nonces: BTreeSet<(KeyHash, Nonce)>,
}

impl<'a, S: LedgerStore + ?Sized> Overlay<'a, S> {
    pub fn new(base: &'a mut S) -> Self {
        Self {
            base,
            balances: BTreeMap::new(),
            keys: BTreeMap::new(),
            nonces: BTreeSet::new(),
        }
    }

    /// Number of buffered writes
    pub fn pending_writes(&self) -> usize {
        self.balances.len() + self.keys.len() + self.nonces.len()
    }

    /// Apply every buffered write to the underlying store.
    pub fn commit(self) {
        let Overlay {
            base,
            balances,
            keys,
            nonces,
        } = self;
        for ((account, asset), amount) in balances {
            base.set_balance(&account, &asset, amount);
        }
        for ((owner, key_hash), authorized) in keys {
            base.set_key_authorized(&owner, &key_hash, authorized);
        }
        for (key_hash, nonce) in nonces {
            base.mark_nonce_used(&key_hash, &nonce);
        }
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Overlay<'_, S> {
    fn balance(&self, account: &Address, asset: &AssetId) -> u64 {
        match self.balances.get(&(account.clone(), asset.clone())) {
            Some(amount) => *amount,
            None => self.base.balance(account, asset),
        }
    }

    fn set_balance(&mut self, account: &Address, asset: &AssetId, amount: u64) {
        self.balances.insert((account.clone(), asset.clone()), amount);
    }

    fn is_key_authorized(&self, owner: &Address, key_hash: &KeyHash) -> bool {
        match self.keys.get(&(owner.clone(), key_hash.clone())) {
            Some(authorized) => *authorized,
            None => self.base.is_key_authorized(owner, key_hash),
        }
    }

    fn set_key_authorized(&mut self, owner: &Address, key_hash: &KeyHash, authorized: bool) {
        self.keys.insert((owner.clone(), key_hash.clone()), authorized);
    }

    fn is_nonce_used(&self, key_hash: &KeyHash, nonce: &Nonce) -> bool {
        self.nonces.contains(&(key_hash.clone(), nonce.clone()))
            || self.base.is_nonce_used(key_hash, nonce)
    }

    fn mark_nonce_used(&mut self, key_hash: &KeyHash, nonce: &Nonce) {
        self.nonces.insert((key_hash.clone(), nonce.clone()));
    }
}
