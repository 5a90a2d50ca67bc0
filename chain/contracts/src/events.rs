//! Contract events
//!
//! Events are immutable records of committed state changes. A bounced
//! trigger emits nothing. Every event carries the id of the trigger that
//! caused it.

use bank_types::ids::{Address, AssetId, Nonce, TriggerId};
use serde::{Deserialize, Serialize};

use crate::keys::KeyHash;

/// Value attached to a plain deposit, credited to the submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub trigger_id: TriggerId,
    pub account: Address,
    pub asset: AssetId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAuthorized {
    pub trigger_id: TriggerId,
    pub owner: Address,
    pub key_hash: KeyHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRevoked {
    pub trigger_id: TriggerId,
    pub owner: Address,
    pub key_hash: KeyHash,
}

/// One external payment line paid out of `owner`'s balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub trigger_id: TriggerId,
    pub owner: Address,
    pub recipient: Address,
    pub asset: AssetId,
    pub amount: u64,
    /// Base charged for this line
    pub fee: u64,
}

/// Internal move between two balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub trigger_id: TriggerId,
    pub from: Address,
    pub to: Address,
    pub asset: AssetId,
    pub amount: u64,
}

/// Internal credit that is neither a deposit nor a transfer: attached value
/// on an operation trigger, buffered credits and recipient allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credited {
    pub trigger_id: TriggerId,
    pub account: Address,
    pub asset: AssetId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceConsumed {
    pub trigger_id: TriggerId,
    pub key_hash: KeyHash,
    pub nonce: Nonce,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposited(Deposited),
    KeyAuthorized(KeyAuthorized),
    KeyRevoked(KeyRevoked),
    Withdrawn(Withdrawn),
    Transferred(Transferred),
    Credited(Credited),
    NonceConsumed(NonceConsumed),
}

impl ContractEvent {
    pub fn trigger_id(&self) -> TriggerId {
        match self {
            ContractEvent::Deposited(e) => e.trigger_id,
            ContractEvent::KeyAuthorized(e) => e.trigger_id,
            ContractEvent::KeyRevoked(e) => e.trigger_id,
            ContractEvent::Withdrawn(e) => e.trigger_id,
            ContractEvent::Transferred(e) => e.trigger_id,
            ContractEvent::Credited(e) => e.trigger_id,
            ContractEvent::NonceConsumed(e) => e.trigger_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn test_withdrawn_serialization() {
        let event = Withdrawn {
            trigger_id: TriggerId::new(),
            owner: addr("ALICE"),
            recipient: addr("ALICE"),
            asset: AssetId::Base,
            amount: 100_000_000,
            fee: 2_000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: Withdrawn = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_trigger_id() {
        let id = TriggerId::new();
        let event = ContractEvent::NonceConsumed(NonceConsumed {
            trigger_id: id,
            key_hash: KeyHash::from_hex("cd".repeat(32)).unwrap(),
            nonce: Nonce::from(1),
        });
        assert_eq!(event.trigger_id(), id);
        assert!(matches!(event, ContractEvent::NonceConsumed(_)));
    }

    #[test]
    fn test_credited_json_shape() {
        let event = Credited {
            trigger_id: TriggerId::new(),
            account: addr("EATER"),
            asset: AssetId::token("cherries").unwrap(),
            amount: 2_000_000_000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["asset"], "cherries");
        assert_eq!(json["amount"], 2_000_000_000u64);
    }
}
