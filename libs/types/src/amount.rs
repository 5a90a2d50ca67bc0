//! Requested amounts
//!
//! A withdraw or transfer names either an exact integer amount or the
//! `"all"` sentinel. The sentinel never travels past parsing as a string: the
//! balance store resolves it against the current balance at debit time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::TypeError;

/// Sentinel accepted in place of a literal amount
pub const ALL: &str = "all";

/// Requested amount of a withdraw or transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Amount {
    /// A literal, strictly positive amount
    Exact(u64),
    /// The entire available balance
    All,
}

impl Amount {
    /// Parse a JSON amount: a positive integer or the string `"all"`.
    ///
    /// Integers written in float form (`1e3`, `1000.0`) are accepted when
    /// they are whole and fit in a `u64`.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::String(s) if s == ALL => Ok(Amount::All),
            Value::Number(n) => match n.as_u64().or_else(|| n.as_f64().and_then(whole_u64)) {
                Some(v) if v > 0 => Ok(Amount::Exact(v)),
                _ => Err(TypeError::InvalidAmount(n.to_string())),
            },
            other => Err(TypeError::InvalidAmount(other.to_string())),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Amount::All)
    }
}

/// Renders exactly what a signer sees: the decimal integer or `all`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Exact(v) => write!(f, "{}", v),
            Amount::All => write!(f, "{}", ALL),
        }
    }
}

impl TryFrom<Value> for Amount {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<Amount> for Value {
    fn from(amount: Amount) -> Self {
        match amount {
            Amount::Exact(v) => Value::from(v),
            Amount::All => Value::from(ALL),
        }
    }
}

/// Whole, non-negative float below 2^64
fn whole_u64(f: f64) -> Option<u64> {
    const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < TWO_POW_64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Parse a strictly positive integer amount (no sentinel allowed)
pub fn positive_amount(value: &Value) -> Result<u64, TypeError> {
    match Amount::from_value(value)? {
        Amount::Exact(v) => Ok(v),
        Amount::All => Err(TypeError::InvalidAmount(ALL.to_string())),
    }
}
