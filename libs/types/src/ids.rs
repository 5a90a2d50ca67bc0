//! Identifier types for ledger entities
//!
//! Addresses and asset ids are opaque strings assigned by the host ledger.
//! They end up inside persisted state keys (`balance_<account>_<asset>`), so
//! parsing rejects anything that could make such a key ambiguous.
//! Trigger ids use UUID v7 for chronological ordering of processed triggers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::errors::TypeError;

/// Longest accepted address or asset identifier
pub const MAX_ID_LEN: usize = 64;

/// Reserved identifier of the ledger's native unit
pub const BASE_ASSET: &str = "base";

/// Account identifier (a person's address or another contract's address)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse an address. Only ASCII letters and digits are accepted.
    pub fn new(address: impl Into<String>) -> Result<Self, TypeError> {
        let s = address.into();
        if s.is_empty() || s.len() > MAX_ID_LEN || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Address {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Asset identifier
///
/// `"base"` is the native unit used for fees; every other value is an opaque
/// token id (base64 alphabet in practice).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetId {
    Base,
    Token(String),
}

impl AssetId {
    /// Parse an asset identifier
    pub fn new(asset: impl Into<String>) -> Result<Self, TypeError> {
        let s = asset.into();
        if s == BASE_ASSET {
            return Ok(AssetId::Base);
        }
        let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=');
        if s.is_empty() || s.len() > MAX_ID_LEN || !s.chars().all(valid_char) {
            return Err(TypeError::InvalidAsset(s));
        }
        Ok(AssetId::Token(s))
    }

    /// Parse a token asset id; `"base"` is rejected.
    pub fn token(id: &str) -> Result<Self, TypeError> {
        match Self::new(id)? {
            AssetId::Base => Err(TypeError::InvalidAsset(id.to_string())),
            token => Ok(token),
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, AssetId::Base)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssetId::Base => BASE_ASSET,
            AssetId::Token(id) => id,
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for AssetId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AssetId> for String {
    fn from(asset: AssetId) -> Self {
        match asset {
            AssetId::Base => BASE_ASSET.to_string(),
            AssetId::Token(id) => id,
        }
    }
}

/// Unique identifier for a trigger (the unit that invoked the bank)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(Uuid);

impl TriggerId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TriggerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-chosen replay token, scoped per authorized key
///
/// Kept in the exact textual form it was received in: JSON numbers are
/// rendered by `serde_json`, strings verbatim. That text is what the signer
/// signs and what the consumed-nonce key is built from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct Nonce(String);

impl Nonce {
    pub fn new(nonce: impl Into<String>) -> Result<Self, TypeError> {
        let s = nonce.into();
        if s.is_empty() || s.len() > MAX_ID_LEN || s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidNonce(s));
        }
        Ok(Self(s))
    }

    /// Accept a JSON number or string
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Number(n) => Self::new(n.to_string()),
            Value::String(s) => Self::new(s.clone()),
            other => Err(TypeError::InvalidNonce(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl TryFrom<Value> for Nonce {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<Nonce> for String {
    fn from(nonce: Nonce) -> Self {
        nonce.0
    }
}
