//! Trigger classification
//!
//! Turns a trigger's free-form data object into exactly one [`Request`], or
//! rejects it before any state is touched. Contradictory selectors, unknown
//! fields next to a selector, partial delegation fields and malformed values
//! all fail here with a validation error.

use bank_types::amount::Amount;
use bank_types::ids::{Address, AssetId, Nonce};
use bank_types::message::SignableAction;
use bank_types::payment::PaymentRequest;
use bank_types::trigger::Trigger;
use ed25519_dalek::VerifyingKey;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::BankConfig;
use crate::errors::BankError;
use crate::keys::parse_public_key;
use crate::verifier::Delegation;

/// Canonical key-authorization selector
pub const AUTHORIZE_KEY: &str = "authorize_key";
/// Deprecated alias of [`AUTHORIZE_KEY`], still accepted in protocol version 1
pub const AUTHORIZE_ALIAS: &str = "authorize";

const REVOKE: &str = "revoke";
const WITHDRAW: &str = "withdraw";
const TRANSFER: &str = "transfer";
const RECIPIENTS: &str = "recipients";

const DELEGATION_FIELDS: [&str; 4] = ["owner", "pubkey", "nonce", "signature"];

const RECOGNISED_FIELDS: [&str; 13] = [
    AUTHORIZE_KEY,
    AUTHORIZE_ALIAS,
    REVOKE,
    WITHDRAW,
    TRANSFER,
    RECIPIENTS,
    "asset",
    "amount",
    "to",
    "owner",
    "pubkey",
    "nonce",
    "signature",
];

/// One classified trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Credit the attached value to the submitter
    Deposit,
    AuthorizeKey {
        public_key: VerifyingKey,
    },
    RevokeKey {
        public_key: VerifyingKey,
    },
    /// Pay the owner externally
    Withdraw {
        asset: AssetId,
        amount: Amount,
        delegation: Option<Delegation>,
    },
    /// Move value between internal balances
    Transfer {
        asset: AssetId,
        amount: Amount,
        to: Address,
        delegation: Option<Delegation>,
    },
    /// Withdraw to several recipients in one batch
    Distribute {
        recipients: Vec<PaymentRequest>,
        delegation: Option<Delegation>,
    },
    /// Allocate the attached value to the listed recipients
    MessageRecipients {
        recipients: Vec<PaymentRequest>,
    },
}

impl Request {
    /// Classify `trigger` against the bank's limits.
    pub fn parse(trigger: &Trigger, config: &BankConfig) -> Result<Self, BankError> {
        let fields = match trigger.data.as_ref() {
            Some(Value::Object(map)) => map,
            _ => return deposit(trigger),
        };
        if !fields.keys().any(|k| RECOGNISED_FIELDS.contains(&k.as_str())) {
            return deposit(trigger);
        }

        let selectors: Vec<&str> = [AUTHORIZE_KEY, AUTHORIZE_ALIAS, REVOKE, WITHDRAW, TRANSFER]
            .into_iter()
            .filter(|name| is_set(fields, name))
            .collect();
        if selectors.len() > 1 {
            return Err(BankError::validation(format!(
                "conflicting operations: {}",
                selectors.join(", ")
            )));
        }
        let has_recipients = fields.contains_key(RECIPIENTS);

        match selectors.first().copied() {
            Some(name @ (AUTHORIZE_KEY | AUTHORIZE_ALIAS)) => {
                if name == AUTHORIZE_ALIAS {
                    debug!(submitter = %trigger.address, "deprecated selector 'authorize' used");
                }
                only_fields(fields, &[name, "pubkey", "owner", "nonce", "signature"])?;
                let public_key = key_management(trigger, fields)?;
                Ok(Request::AuthorizeKey { public_key })
            }
            Some(REVOKE) => {
                only_fields(fields, &[REVOKE, "pubkey", "owner", "nonce", "signature"])?;
                let public_key = key_management(trigger, fields)?;
                Ok(Request::RevokeKey { public_key })
            }
            Some(WITHDRAW) if has_recipients => {
                only_fields(fields, &with_delegation(&[WITHDRAW, RECIPIENTS]))?;
                let recipients = parse_recipients(fields, config)?;
                let delegation = parse_delegation(fields)?;
                Ok(Request::Distribute {
                    recipients,
                    delegation,
                })
            }
            Some(WITHDRAW) => {
                only_fields(fields, &with_delegation(&[WITHDRAW, "asset", "amount"]))?;
                Ok(Request::Withdraw {
                    asset: parse_asset(fields)?,
                    amount: parse_amount(fields)?,
                    delegation: parse_delegation(fields)?,
                })
            }
            Some(TRANSFER) => {
                if has_recipients {
                    return Err(BankError::validation(
                        "recipients can only be combined with withdraw",
                    ));
                }
                only_fields(fields, &with_delegation(&[TRANSFER, "asset", "amount", "to"]))?;
                let to = match fields.get("to") {
                    Some(Value::String(s)) => Address::new(s.as_str())?,
                    Some(_) => return Err(BankError::validation("to must be an address")),
                    None => return Err(BankError::validation("missing to")),
                };
                Ok(Request::Transfer {
                    asset: parse_asset(fields)?,
                    amount: parse_amount(fields)?,
                    to,
                    delegation: parse_delegation(fields)?,
                })
            }
            Some(other) => Err(BankError::validation(format!("unsupported operation: {}", other))),
            None if has_recipients => {
                only_fields(fields, &[RECIPIENTS])?;
                Ok(Request::MessageRecipients {
                    recipients: parse_recipients(fields, config)?,
                })
            }
            None => Err(BankError::validation("no operation selected")),
        }
    }

    /// Short operation name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Deposit => "deposit",
            Request::AuthorizeKey { .. } => "authorize_key",
            Request::RevokeKey { .. } => "revoke",
            Request::Withdraw { .. } => "withdraw",
            Request::Transfer { .. } => "transfer",
            Request::Distribute { .. } => "distribute",
            Request::MessageRecipients { .. } => "recipients",
        }
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        match self {
            Request::Withdraw { delegation, .. }
            | Request::Transfer { delegation, .. }
            | Request::Distribute { delegation, .. } => delegation.as_ref(),
            _ => None,
        }
    }

    /// Fields a delegated signature must cover, for operations that accept one
    pub fn signable(&self) -> Option<SignableAction<'_>> {
        match self {
            Request::Withdraw { asset, amount, .. } => Some(SignableAction::Withdraw { amount, asset }),
            Request::Transfer {
                asset, amount, to, ..
            } => Some(SignableAction::Transfer { amount, asset, to }),
            Request::Distribute { recipients, .. } => Some(SignableAction::Distribute { recipients }),
            _ => None,
        }
    }
}

fn deposit(trigger: &Trigger) -> Result<Request, BankError> {
    if trigger.outputs.values().all(|amount| *amount == 0) {
        return Err(BankError::validation("nothing to deposit"));
    }
    Ok(Request::Deposit)
}

/// A selector counts when present with a truthy value.
fn is_set(fields: &Map<String, Value>, name: &str) -> bool {
    match fields.get(name) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn with_delegation(base: &[&'static str]) -> Vec<&'static str> {
    base.iter().copied().chain(DELEGATION_FIELDS).collect()
}

fn only_fields(fields: &Map<String, Value>, allowed: &[&str]) -> Result<(), BankError> {
    match fields.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(unknown) => Err(BankError::validation(format!("unexpected field: {}", unknown))),
        None => Ok(()),
    }
}

/// Key management is owner-only: no delegation of any kind.
fn key_management(trigger: &Trigger, fields: &Map<String, Value>) -> Result<VerifyingKey, BankError> {
    if fields.contains_key("signature") || fields.contains_key("nonce") {
        return Err(BankError::Unauthorized);
    }
    if let Some(owner) = fields.get("owner") {
        if owner.as_str() != Some(trigger.address.as_str()) {
            return Err(BankError::Unauthorized);
        }
    }
    match fields.get("pubkey") {
        Some(Value::String(pubkey)) => parse_public_key(pubkey),
        Some(_) => Err(BankError::validation("invalid pubkey")),
        None => Err(BankError::validation("missing pubkey")),
    }
}

fn parse_asset(fields: &Map<String, Value>) -> Result<AssetId, BankError> {
    match fields.get("asset") {
        Some(Value::String(s)) => Ok(AssetId::new(s.as_str())?),
        Some(other) => Err(BankError::validation(format!("invalid asset: {}", other))),
        None => Err(BankError::validation("missing asset")),
    }
}

fn parse_amount(fields: &Map<String, Value>) -> Result<Amount, BankError> {
    let value = fields
        .get("amount")
        .ok_or_else(|| BankError::validation("missing amount"))?;
    Ok(Amount::from_value(value)?)
}

fn parse_recipients(
    fields: &Map<String, Value>,
    config: &BankConfig,
) -> Result<Vec<PaymentRequest>, BankError> {
    let list = match fields.get(RECIPIENTS) {
        Some(Value::Array(list)) => list,
        _ => return Err(BankError::validation("recipients must be an array")),
    };
    if list.is_empty() {
        return Err(BankError::validation("recipients must not be empty"));
    }
    if list.len() > config.max_recipients {
        return Err(BankError::validation(format!(
            "too many recipients: {} > {}",
            list.len(),
            config.max_recipients
        )));
    }
    list.iter()
        .enumerate()
        .map(|(i, value)| {
            let recipient: PaymentRequest = serde_json::from_value(value.clone())
                .map_err(|e| BankError::validation(format!("invalid recipient #{}: {}", i, e)))?;
            if recipient.amount == 0 {
                return Err(BankError::validation(format!(
                    "invalid recipient #{}: amount must be positive",
                    i
                )));
            }
            Ok(recipient)
        })
        .collect()
}

fn text_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str, BankError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BankError::validation(format!("invalid {}", name)))
}

fn parse_delegation(fields: &Map<String, Value>) -> Result<Option<Delegation>, BankError> {
    let present = DELEGATION_FIELDS
        .iter()
        .filter(|name| fields.contains_key(**name))
        .count();
    if present == 0 {
        return Ok(None);
    }
    if present < DELEGATION_FIELDS.len() {
        return Err(BankError::validation(
            "delegated call needs owner, pubkey, nonce and signature",
        ));
    }

    let owner = Address::new(text_field(fields, "owner")?)?;
    let public_key = parse_public_key(text_field(fields, "pubkey")?)?;
    let nonce = fields
        .get("nonce")
        .map(Nonce::from_value)
        .transpose()?
        .ok_or_else(|| BankError::validation("missing nonce"))?;
    let signature = text_field(fields, "signature")?;
    Ok(Some(Delegation::new(owner, public_key, nonce, signature)))
}
