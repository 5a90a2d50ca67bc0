//! Signature / Delegation Verifier
//!
//! A delegated call lets any submitter act "as" an owner when it carries
//! `{owner, pubkey, nonce, signature}`. The submitter's own identity is never
//! consulted; authority comes from the key registry and the signature alone.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. the key is authorized for the owner
//! 2. the (key, nonce) pair has not been consumed
//! 3. the signature verifies over the canonical message
//!
//! The nonce is consumed separately by [`consume_nonce`] once the rest of the
//! operation has succeeded, inside the same overlay as the balance writes.

use bank_types::ids::{Address, Nonce};
use bank_types::message::SignableAction;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::errors::BankError;
use crate::keys::KeyHash;
use crate::store::LedgerStore;

/// Delegation fields of one request, already parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub owner: Address,
    pub public_key: VerifyingKey,
    pub key_hash: KeyHash,
    pub nonce: Nonce,
    /// Hex-encoded ed25519 signature as received
    pub signature: String,
}

impl Delegation {
    pub fn new(owner: Address, public_key: VerifyingKey, nonce: Nonce, signature: impl Into<String>) -> Self {
        Self {
            owner,
            key_hash: KeyHash::of(&public_key),
            public_key,
            nonce,
            signature: signature.into(),
        }
    }
}

/// Validate a delegated call against the current state.
pub fn verify<S: LedgerStore + ?Sized>(
    store: &S,
    delegation: &Delegation,
    action: &SignableAction<'_>,
) -> Result<(), BankError> {
    if !store.is_key_authorized(&delegation.owner, &delegation.key_hash) {
        return Err(BankError::KeyNotAuthorized);
    }
    if store.is_nonce_used(&delegation.key_hash, &delegation.nonce) {
        return Err(BankError::NonceReused);
    }

    let sig_bytes: [u8; 64] = hex::decode(delegation.signature.trim())
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or(BankError::BadSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);

    let message = action.canonical_bytes(&delegation.nonce);
    delegation
        .public_key
        .verify(&message, &signature)
        .map_err(|_| BankError::BadSignature)
}

/// Mark the delegation's nonce as consumed.
pub fn consume_nonce<S: LedgerStore + ?Sized>(store: &mut S, delegation: &Delegation) {
    store.mark_nonce_used(&delegation.key_hash, &delegation.nonce);
}

/// Produce the hex signature a key holder attaches to a delegated request.
pub fn sign(signing_key: &SigningKey, action: &SignableAction<'_>, nonce: &Nonce) -> String {
    let signature = signing_key.sign(&action.canonical_bytes(nonce));
    hex::encode(signature.to_bytes())
}
