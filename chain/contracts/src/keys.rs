//! Key Authorization Registry
//!
//! An owner pre-authorizes external ed25519 keys that may then sign
//! withdrawals and transfers on its behalf. Entries are keyed by
//! `(owner, KeyHash)`; only the owner itself may add or remove them, which
//! the request parser enforces before these functions are reached.

use bank_types::ids::Address;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::BankError;
use crate::store::LedgerStore;

/// Lowercase hex SHA-256 of a public key's 32-byte canonical encoding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyHash(String);

impl KeyHash {
    pub fn of(public_key: &VerifyingKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(public_key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept an already computed hash (64 hex digits, any case)
    pub fn from_hex(hash: impl AsRef<str>) -> Result<Self, BankError> {
        let hash = hash.as_ref();
        let bytes = hex::decode(hash).map_err(|_| BankError::validation("invalid key hash"))?;
        if bytes.len() != 32 {
            return Err(BankError::validation("invalid key hash"));
        }
        Ok(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a hex-encoded ed25519 public key
pub fn parse_public_key(pubkey: &str) -> Result<VerifyingKey, BankError> {
    let bytes: [u8; 32] = hex::decode(pubkey.trim())
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| BankError::validation("invalid pubkey"))?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| BankError::validation("invalid pubkey"))
}

/// Authorize `public_key` to sign for `owner`. Idempotent.
pub fn authorize<S: LedgerStore + ?Sized>(
    store: &mut S,
    owner: &Address,
    public_key: &VerifyingKey,
) -> KeyHash {
    let key_hash = KeyHash::of(public_key);
    store.set_key_authorized(owner, &key_hash, true);
    key_hash
}

/// Remove the authorization. Revoking an unknown key is a no-op.
pub fn revoke<S: LedgerStore + ?Sized>(
    store: &mut S,
    owner: &Address,
    public_key: &VerifyingKey,
) -> KeyHash {
    let key_hash = KeyHash::of(public_key);
    store.set_key_authorized(owner, &key_hash, false);
    key_hash
}

pub fn is_authorized<S: LedgerStore + ?Sized>(store: &S, owner: &Address, key_hash: &KeyHash) -> bool {
    store.is_key_authorized(owner, key_hash)
}
