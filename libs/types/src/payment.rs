//! Payment requests and response-unit messages
//!
//! A `PaymentRequest` lives only while one trigger is processed. The message
//! types mirror what the host ledger expects in a response unit:
//! `{"app": "payment", "payload": {asset, outputs}}` and
//! `{"app": "data", "payload": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{Address, AssetId};

/// One desired outgoing payment within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentRequest {
    pub address: Address,
    pub asset: AssetId,
    pub amount: u64,
    /// Recipient is a contract of this protocol: credit it through the bank
    #[serde(default)]
    pub is_aa: bool,
}

impl PaymentRequest {
    pub fn new(address: Address, asset: AssetId, amount: u64, is_aa: bool) -> Self {
        Self {
            address,
            asset,
            amount,
            is_aa,
        }
    }

    /// Drop the routing flag, keeping the credit the custodian must apply
    pub fn to_buffer_recipient(&self) -> BufferRecipient {
        BufferRecipient {
            address: self.address.clone(),
            asset: self.asset.clone(),
            amount: self.amount,
        }
    }
}

/// A buffered credit: value custodied by the bank on behalf of `address`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRecipient {
    pub address: Address,
    pub asset: AssetId,
    pub amount: u64,
}

/// One output of a payment message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub address: Address,
    pub amount: u64,
}

/// Payload of a single-asset, multi-output payment message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub asset: AssetId,
    pub outputs: Vec<Output>,
}

impl PaymentPayload {
    pub fn total(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount).sum()
    }
}

/// A message of a response unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "app", content = "payload", rename_all = "lowercase")]
pub enum Message {
    Payment(PaymentPayload),
    Data(Value),
}

/// The single unit produced by a trigger that pays out externally
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseUnit {
    pub messages: Vec<Message>,
}

impl ResponseUnit {
    /// All payment payloads, in message order
    pub fn payments(&self) -> impl Iterator<Item = &PaymentPayload> {
        self.messages.iter().filter_map(|m| match m {
            Message::Payment(p) => Some(p),
            Message::Data(_) => None,
        })
    }

    /// First data payload, if any
    pub fn data(&self) -> Option<&Value> {
        self.messages.iter().find_map(|m| match m {
            Message::Data(d) => Some(d),
            Message::Payment(_) => None,
        })
    }

    /// Flattened `(asset, address, amount)` payments, excluding `exclude`
    /// (typically the paying contract's own change address).
    pub fn external_payments(&self, exclude: &Address) -> Vec<(AssetId, Address, u64)> {
        self.payments()
            .flat_map(|p| {
                p.outputs
                    .iter()
                    .filter(|o| &o.address != exclude)
                    .map(|o| (p.asset.clone(), o.address.clone(), o.amount))
            })
            .collect()
    }
}
