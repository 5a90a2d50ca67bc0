//! Allocating attached value to recipients, and batch distribution
//!
//! `recipients` alone splits the value attached to the trigger among the
//! listed accounts. `withdraw` + `recipients` pays out of the owner's
//! balance, directly for ordinary lines and by internal credit for
//! bank-aware ones.

mod common;

use bank_contract::events::ContractEvent;
use bank_types::ids::AssetId;
use bank_types::payment::{Message, Output, PaymentPayload};
use bank_types::trigger::Trigger;
use common::*;
use serde_json::json;

// ═══════════════════════════════════════════════════════════════════
// Recipients without withdraw
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_alice_splits_attached_base() {
    let mut bank = bank();
    let trigger = Trigger::new(addr("ALICE"))
        .with_output(AssetId::Base, 5_000_000_000)
        .with_data(json!({"recipients": [
            {"address": "USER1", "asset": "base", "amount": 2_000_000_000u64},
            {"address": "USER2", "asset": "base", "amount": 3_000_000_000u64},
        ]}));
    let response = bank.handle(&trigger);
    assert_ok(&response);
    assert!(response.response_unit.is_none());
    assert_eq!(bank.store().var("balance_USER1_base"), Some(2_000_000_000));
    assert_eq!(bank.store().var("balance_USER2_base"), Some(3_000_000_000));
    assert_eq!(bank.store().var("balance_ALICE_base"), None);
}

#[test]
fn test_alice_splits_two_assets() {
    let mut bank = bank();
    let trigger = Trigger::new(addr("ALICE"))
        .with_output(AssetId::Base, 6_000_000_000)
        .with_output(cherries(), 4_000_000_000)
        .with_data(json!({"recipients": [
            {"address": "USER1", "asset": "cherries", "amount": 1_000_000_000u64},
            {"address": "USER2", "asset": "base", "amount": 2_000_000_000u64},
            {"address": "USER3", "asset": "cherries", "amount": 3_000_000_000u64},
            {"address": "USER1", "asset": "base", "amount": 4_000_000_000u64},
        ]}));
    assert_ok(&bank.handle(&trigger));
    assert_eq!(bank.balance(&addr("USER1"), &AssetId::Base), 4_000_000_000);
    assert_eq!(bank.balance(&addr("USER2"), &AssetId::Base), 2_000_000_000);
    assert_eq!(bank.balance(&addr("USER1"), &cherries()), 1_000_000_000);
    assert_eq!(bank.balance(&addr("USER3"), &cherries()), 3_000_000_000);
}

#[test]
fn test_unallocated_remainder_goes_to_sender() {
    let mut bank = bank();
    let trigger = Trigger::new(addr("ALICE"))
        .with_output(AssetId::Base, 10_000)
        .with_output(cherries(), 70)
        .with_data(json!({"recipients": [
            {"address": "USER1", "asset": "cherries", "amount": 50, "is_aa": true},
        ]}));
    assert_ok(&bank.handle(&trigger));
    assert_eq!(bank.balance(&addr("USER1"), &cherries()), 50);
    assert_eq!(bank.balance(&addr("ALICE"), &cherries()), 20);
    assert_eq!(bank.balance(&addr("ALICE"), &AssetId::Base), 10_000);
}

#[test]
fn test_allocation_needs_attached_asset() {
    let mut bank = bank();
    let trigger = Trigger::new(addr("ALICE"))
        .with_output(AssetId::Base, 10_000)
        .with_data(json!({"recipients": [
            {"address": "USER1", "asset": "cherries", "amount": 1},
        ]}));
    let response = bank.handle(&trigger);
    assert_bounced(&response, "recipients need 1 of cherries but only 0 attached");
    assert!(bank.store().state_vars().is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// Distribute (withdraw + recipients)
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_distribute_mixed_routing() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", cherries(), 5_000_000_000));
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 100_000));

    let response = call(
        &mut bank,
        "ALICE",
        json!({"withdraw": 1, "recipients": [
            {"address": "USER1", "asset": "cherries", "amount": 1_000_000_000u64, "is_aa": false},
            {"address": "EATER", "asset": "cherries", "amount": 2_000_000_000u64, "is_aa": true},
        ]}),
    );
    assert_ok(&response);

    let unit = response.response_unit.unwrap();
    assert_eq!(
        unit.messages,
        vec![Message::Payment(PaymentPayload {
            asset: cherries(),
            outputs: vec![Output {
                address: addr("USER1"),
                amount: 1_000_000_000
            }],
        })]
    );
    assert_eq!(bank.balance(&addr("EATER"), &cherries()), 2_000_000_000);
    assert_eq!(bank.balance(&addr("ALICE"), &cherries()), 2_000_000_000);
    // one external line, one fee; the attachment is credited back
    assert_eq!(
        bank.balance(&addr("ALICE"), &AssetId::Base),
        100_000 - WITHDRAWAL_FEE + ATTACHED
    );
}

#[test]
fn test_distribute_fee_per_external_line() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 100_000));

    let response = call(
        &mut bank,
        "ALICE",
        json!({"withdraw": 1, "recipients": [
            {"address": "USER1", "asset": "base", "amount": 1_000},
            {"address": "USER2", "asset": "base", "amount": 2_000},
            {"address": "USER1", "asset": "base", "amount": 3_000},
        ]}),
    );
    assert_ok(&response);
    let unit = response.response_unit.unwrap();
    assert_eq!(unit.messages.len(), 1);
    assert_eq!(unit.payments().next().unwrap().outputs.len(), 3);
    assert_eq!(
        bank.balance(&addr("ALICE"), &AssetId::Base),
        100_000 - 6_000 - 3 * WITHDRAWAL_FEE + ATTACHED
    );
}

#[test]
fn test_distribute_base_shortfall_reports_total() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 5_000));
    let response = call(
        &mut bank,
        "ALICE",
        json!({"withdraw": 1, "recipients": [
            {"address": "USER1", "asset": "base", "amount": 1_000},
            {"address": "USER2", "asset": "base", "amount": 1_000},
        ]}),
    );
    assert_bounced(&response, "trying to withdraw more than you have: 6000 > 5000");
    assert_eq!(bank.balance(&addr("ALICE"), &AssetId::Base), 5_000);
}

#[test]
fn test_distribute_token_without_base_for_fee() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", cherries(), 100));
    let response = call(
        &mut bank,
        "ALICE",
        json!({"withdraw": 1, "recipients": [
            {"address": "USER1", "asset": "cherries", "amount": 100},
        ]}),
    );
    assert_bounced(&response, "not enough balance in base");
    assert_eq!(bank.balance(&addr("ALICE"), &cherries()), 100);
}

#[test]
fn test_distribute_only_buffered_lines() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 1_000));
    let response = call(
        &mut bank,
        "ALICE",
        json!({"withdraw": 1, "recipients": [
            {"address": "EATER", "asset": "base", "amount": 1_000, "is_aa": true},
        ]}),
    );
    assert_ok(&response);
    assert!(response.response_unit.is_none());
    assert_eq!(bank.balance(&addr("EATER"), &AssetId::Base), 1_000);
    // no external line, no fee
    assert_eq!(bank.balance(&addr("ALICE"), &AssetId::Base), ATTACHED);

    let credited = bank
        .events()
        .iter()
        .filter(|e| matches!(e, ContractEvent::Credited(c) if c.account == addr("EATER")))
        .count();
    assert_eq!(credited, 1);
}

#[test]
fn test_distribute_too_many_recipients() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 1_000_000));
    let line = json!({"address": "USER1", "asset": "base", "amount": 1});
    let lines: Vec<_> = std::iter::repeat(line).take(bank.config().max_recipients + 1).collect();
    let response = call(&mut bank, "ALICE", json!({"withdraw": 1, "recipients": lines}));
    assert!(response.bounced);
    assert_eq!(bank.balance(&addr("ALICE"), &AssetId::Base), 1_000_000);
}
