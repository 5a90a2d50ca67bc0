//! Payment Router
//!
//! Splits a batch of [`PaymentRequest`]s into direct ledger payments and
//! buffered credits for other bank-aware contracts. Everything here is pure:
//! the same ordered input always yields the same output, and nothing reads
//! or writes the store, so the router doubles as a read-only getter.

use bank_types::ids::{Address, AssetId};
use bank_types::payment::{BufferRecipient, Message, Output, PaymentPayload, PaymentRequest, ResponseUnit};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Router output for one batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutedPayments {
    /// One payment message per distinct asset, in first-seen asset order
    pub payment_messages: Vec<Message>,
    /// `is_aa` lines with the flag removed, in input order
    pub buffer_recipients: Vec<BufferRecipient>,
}

impl RoutedPayments {
    /// The unit a client contract emits to forward this batch: the payments,
    /// then a `{"recipients": [...]}` data message if anything is buffered.
    pub fn into_response_unit(self) -> ResponseUnit {
        let mut messages = self.payment_messages;
        if !self.buffer_recipients.is_empty() {
            messages.push(Message::Data(json!({ "recipients": self.buffer_recipients })));
        }
        ResponseUnit { messages }
    }
}

/// Compute what a client must send to pay `payments` through `bank_address`.
///
/// Lines with `is_aa` pay their amount to the bank instead of the recipient
/// and are listed in `buffer_recipients` so the bank can credit them.
pub fn get_payment_messages(payments: &[PaymentRequest], bank_address: &Address) -> RoutedPayments {
    let outputs = payments.iter().map(|p| {
        let address = if p.is_aa { bank_address } else { &p.address };
        (&p.asset, address, p.amount)
    });
    RoutedPayments {
        payment_messages: group_by_asset(outputs),
        buffer_recipients: payments
            .iter()
            .filter(|p| p.is_aa)
            .map(PaymentRequest::to_buffer_recipient)
            .collect(),
    }
}

/// Payment messages for the lines the bank itself pays out (non-`is_aa`).
pub fn external_messages(payments: &[PaymentRequest]) -> Vec<Message> {
    group_by_asset(
        payments
            .iter()
            .filter(|p| !p.is_aa)
            .map(|p| (&p.asset, &p.address, p.amount)),
    )
}

/// Number of lines paid out directly, each of which carries a fee.
pub fn external_line_count(payments: &[PaymentRequest]) -> u64 {
    payments.iter().filter(|p| !p.is_aa).count() as u64
}

/// Group outputs into one message per asset. Outputs keep their relative
/// order and are never merged, even when an address repeats.
fn group_by_asset<'a>(outputs: impl Iterator<Item = (&'a AssetId, &'a Address, u64)>) -> Vec<Message> {
    let mut payloads: Vec<PaymentPayload> = Vec::new();
    for (asset, address, amount) in outputs {
        let output = Output {
            address: address.clone(),
            amount,
        };
        match payloads.iter_mut().find(|p| &p.asset == asset) {
            Some(payload) => payload.outputs.push(output),
            None => payloads.push(PaymentPayload {
                asset: asset.clone(),
                outputs: vec![output],
            }),
        }
    }
    payloads.into_iter().map(Message::Payment).collect()
}
