//! Read-only `get_payment_messages` getter

mod common;

use bank_types::ids::AssetId;
use common::*;
use serde_json::{json, Value};

/// Independent model of the expected getter output
fn expected(payments: &[Value], bank_address: &str) -> Value {
    let mut messages: Vec<Value> = Vec::new();
    for p in payments {
        let target = if p["is_aa"] == json!(true) {
            json!(bank_address)
        } else {
            p["address"].clone()
        };
        let output = json!({"address": target, "amount": p["amount"]});
        match messages
            .iter_mut()
            .find(|m| m["payload"]["asset"] == p["asset"])
        {
            Some(m) => m["payload"]["outputs"].as_array_mut().unwrap().push(output),
            None => messages.push(json!({
                "app": "payment",
                "payload": {"asset": p["asset"], "outputs": [output]}
            })),
        }
    }
    let buffer_recipients: Vec<Value> = payments
        .iter()
        .filter(|p| p["is_aa"] == json!(true))
        .map(|p| json!({"address": p["address"], "asset": p["asset"], "amount": p["amount"]}))
        .collect();
    json!({"payment_messages": messages, "buffer_recipients": buffer_recipients})
}

#[test]
fn test_all_is_aa_combinations() {
    let mut bank = bank();
    assert_ok(&deposit(&mut bank, "ALICE", AssetId::Base, 1_000));
    let state_before = bank.store().clone();

    for mask in 0u8..16 {
        let is_aa = |bit: u8| mask & (1 << bit) != 0;
        let payments = vec![
            json!({"address": "USER1", "asset": "cherries", "amount": 1_000_000_000u64, "is_aa": is_aa(0)}),
            json!({"address": "USER2", "asset": "base", "amount": 2_000_000_000u64, "is_aa": is_aa(1)}),
            json!({"address": "USER3", "asset": "cherries", "amount": 3_000_000_000u64, "is_aa": is_aa(2)}),
            json!({"address": "USER1", "asset": "base", "amount": 4_000_000_000u64, "is_aa": is_aa(3)}),
        ];
        let args = [Value::Array(payments.clone())];

        let first = bank.call_getter("get_payment_messages", &args).unwrap();
        let second = bank.call_getter("get_payment_messages", &args).unwrap();
        assert_eq!(first, second, "mask {:04b}", mask);
        assert_eq!(first, expected(&payments, "BANK"), "mask {:04b}", mask);
        assert_eq!(first["payment_messages"].as_array().unwrap().len(), 2);
    }

    assert_eq!(bank.store(), &state_before);
}

#[test]
fn test_is_aa_defaults_to_false() {
    let bank = bank();
    let result = bank
        .call_getter(
            "get_payment_messages",
            &[json!([{"address": "USER1", "asset": "base", "amount": 7}])],
        )
        .unwrap();
    assert_eq!(result["buffer_recipients"], json!([]));
    assert_eq!(
        result["payment_messages"][0]["payload"]["outputs"],
        json!([{"address": "USER1", "amount": 7}])
    );
}

#[test]
fn test_getter_rejects_bad_arguments() {
    let bank = bank();
    assert!(bank
        .call_getter("get_payment_messages", &[json!({"address": "USER1"})])
        .is_err());
    assert!(bank
        .call_getter(
            "get_payment_messages",
            &[json!([{"address": "USER1", "asset": "base", "amount": 1, "memo": "x"}])]
        )
        .is_err());
    assert!(bank.call_getter("nope", &[json!([])]).is_err());
}
