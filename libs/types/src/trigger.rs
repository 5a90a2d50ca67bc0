//! Trigger and response envelopes
//!
//! The host ledger delivers each call as one atomic trigger: who sent it,
//! how much of each asset was attached, and an optional structured payload.
//! The bank answers with a response that either bounced with an error or
//! succeeded, optionally carrying a single response unit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::{Address, AssetId, TriggerId};
use crate::payment::ResponseUnit;

/// One incoming call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    /// Submitter of the triggering unit
    pub address: Address,
    /// Value attached per asset
    #[serde(default)]
    pub outputs: BTreeMap<AssetId, u64>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Trigger {
    pub fn new(address: Address) -> Self {
        Self {
            id: TriggerId::new(),
            address,
            outputs: BTreeMap::new(),
            data: None,
        }
    }

    /// Attach `amount` of `asset` (accumulates, saturating at `u64::MAX`)
    pub fn with_output(mut self, asset: AssetId, amount: u64) -> Self {
        let total = self.outputs.entry(asset).or_insert(0);
        *total = total.saturating_add(amount);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attached amount of `asset`, 0 when absent
    pub fn output(&self, asset: &AssetId) -> u64 {
        self.outputs.get(asset).copied().unwrap_or(0)
    }
}

/// Outcome of one trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub trigger_id: TriggerId,
    pub bounced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_unit: Option<ResponseUnit>,
}

impl Response {
    pub fn success(trigger_id: TriggerId, response_unit: Option<ResponseUnit>) -> Self {
        Self {
            trigger_id,
            bounced: false,
            error: None,
            response_unit,
        }
    }

    pub fn bounce(trigger_id: TriggerId, error: impl Into<String>) -> Self {
        Self {
            trigger_id,
            bounced: true,
            error: Some(error.into()),
            response_unit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_outputs_accumulate() {
        let trigger = Trigger::new(Address::new("ALICE").unwrap())
            .with_output(AssetId::Base, 10_000)
            .with_output(AssetId::Base, 5)
            .with_output(AssetId::token("cherries").unwrap(), 7);
        assert_eq!(trigger.output(&AssetId::Base), 10_005);
        assert_eq!(trigger.output(&AssetId::token("cherries").unwrap()), 7);
        assert_eq!(trigger.output(&AssetId::token("plums").unwrap()), 0);
    }

    #[test]
    fn test_trigger_outputs_saturate() {
        let trigger = Trigger::new(Address::new("ALICE").unwrap())
            .with_output(AssetId::Base, u64::MAX)
            .with_output(AssetId::Base, 1);
        assert_eq!(trigger.output(&AssetId::Base), u64::MAX);
    }

    #[test]
    fn test_trigger_deserializes_outputs_by_asset() {
        let trigger: Trigger = serde_json::from_value(json!({
            "id": TriggerId::new(),
            "address": "ALICE",
            "outputs": {"base": 10000, "cherries": 5},
            "data": {"withdraw": 1}
        }))
        .unwrap();
        assert_eq!(trigger.output(&AssetId::Base), 10_000);
        assert_eq!(trigger.data, Some(json!({"withdraw": 1})));
    }

    #[test]
    fn test_bounce_has_no_unit() {
        let r = Response::bounce(TriggerId::new(), "this nonce was already used");
        assert!(r.bounced);
        assert!(r.response_unit.is_none());
        assert_eq!(r.error.as_deref(), Some("this nonce was already used"));
    }
}
