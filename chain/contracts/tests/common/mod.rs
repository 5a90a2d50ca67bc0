//! Shared fixtures for the bank integration tests

#![allow(dead_code)]

use bank_contract::{Bank, BankConfig};
use bank_types::ids::{Address, AssetId};
use bank_types::trigger::{Response, Trigger};
use serde_json::Value;

pub const WITHDRAWAL_FEE: u64 = 2_000;
/// Base attached to every operation trigger, as a wallet would to pay for it
pub const ATTACHED: u64 = 10_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

pub fn cherries() -> AssetId {
    AssetId::token("cherries").unwrap()
}

pub fn bank() -> Bank {
    init_tracing();
    Bank::new(BankConfig::new(addr("BANK"))).unwrap()
}

/// Send value with no data
pub fn deposit(bank: &mut Bank, from: &str, asset: AssetId, amount: u64) -> Response {
    bank.handle(&Trigger::new(addr(from)).with_output(asset, amount))
}

/// Trigger with the usual base attachment and a data payload
pub fn call(bank: &mut Bank, from: &str, data: Value) -> Response {
    let trigger = Trigger::new(addr(from))
        .with_output(AssetId::Base, ATTACHED)
        .with_data(data);
    bank.handle(&trigger)
}

pub fn assert_ok(response: &Response) {
    assert!(!response.bounced, "unexpected bounce: {:?}", response.error);
    assert!(response.error.is_none());
}

pub fn assert_bounced(response: &Response, error: &str) {
    assert!(response.bounced, "expected bounce with '{}'", error);
    assert_eq!(response.error.as_deref(), Some(error));
    assert!(response.response_unit.is_none());
}
