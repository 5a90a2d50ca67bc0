//! Request Dispatcher
//!
//! [`Bank`] owns the ledger store and processes one trigger at a time. Each
//! trigger is classified by [`Request::parse`], executed against an
//! [`Overlay`] of the store, and either committed as a whole or bounced with
//! no effect.
//!
//! Execution order for operations that move the owner's funds:
//! 1. Resolve the acting owner (verify the delegation if present)
//! 2. Resolve `"all"` and check balances, debiting the owner
//! 3. Credit the counterparties
//! 4. Consume the delegation nonce
//! 5. Credit the value attached to the trigger to the acting owner

use bank_types::amount::Amount;
use bank_types::ids::{Address, AssetId, Nonce};
use bank_types::payment::{PaymentRequest, ResponseUnit};
use bank_types::trigger::{Response, Trigger};
use ed25519_dalek::VerifyingKey;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::balances;
use crate::config::BankConfig;
use crate::errors::BankError;
use crate::events::{
    ContractEvent, Credited, Deposited, KeyAuthorized, KeyRevoked, NonceConsumed, Transferred,
    Withdrawn,
};
use crate::keys::{self, KeyHash};
use crate::overlay::Overlay;
use crate::request::Request;
use crate::router::{self, RoutedPayments};
use crate::store::{LedgerStore, MemoryStore};
use crate::verifier::{self, Delegation};

/// Name of the read-only getter exposed through [`Bank::call_getter`]
pub const GET_PAYMENT_MESSAGES: &str = "get_payment_messages";

/// A custodial ledger instance.
#[derive(Debug)]
pub struct Bank<S: LedgerStore = MemoryStore> {
    config: BankConfig,
    store: S,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl Bank<MemoryStore> {
    /// Create a bank over an empty in-memory store.
    pub fn new(config: BankConfig) -> Result<Self, BankError> {
        Self::with_store(config, MemoryStore::new())
    }
}

impl<S: LedgerStore> Bank<S> {
    /// Create a bank over an existing store. The config is validated first.
    pub fn with_store(config: BankConfig, store: S) -> Result<Self, BankError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn address(&self) -> &Address {
        &self.config.bank_address
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ───────────────────────── Triggers ─────────────────────────

    /// Process one trigger to completion.
    pub fn handle(&mut self, trigger: &Trigger) -> Response {
        let mut exec = Execution {
            config: &self.config,
            store: Overlay::new(&mut self.store),
            trigger,
            events: Vec::new(),
        };

        let outcome = Request::parse(trigger, exec.config).and_then(|request| {
            debug!(
                trigger_id = %trigger.id,
                submitter = %trigger.address,
                kind = request.kind(),
                delegated = request.delegation().is_some(),
                "Trigger classified"
            );
            exec.run(&request).map(|unit| (request.kind(), unit))
        });

        match outcome {
            Ok((kind, unit)) => {
                let Execution { store, events, .. } = exec;
                let writes = store.pending_writes();
                store.commit();
                info!(
                    trigger_id = %trigger.id,
                    kind,
                    writes,
                    events = events.len(),
                    pays_out = unit.is_some(),
                    "Trigger committed"
                );
                self.events.extend(events);
                Response::success(trigger.id, unit)
            }
            Err(err) => {
                warn!(
                    trigger_id = %trigger.id,
                    submitter = %trigger.address,
                    error = %err,
                    "Trigger bounced"
                );
                Response::bounce(trigger.id, err.to_string())
            }
        }
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Split `payments` into what a client must send and what the bank will
    /// credit on its behalf. Reads no state.
    pub fn get_payment_messages(&self, payments: &[PaymentRequest]) -> RoutedPayments {
        router::get_payment_messages(payments, &self.config.bank_address)
    }

    /// Dispatch a read-only getter by name with JSON arguments.
    pub fn call_getter(&self, name: &str, args: &[Value]) -> Result<Value, BankError> {
        match name {
            GET_PAYMENT_MESSAGES => {
                let [payments] = args else {
                    return Err(BankError::validation(format!(
                        "{} takes 1 argument, got {}",
                        name,
                        args.len()
                    )));
                };
                let payments: Vec<PaymentRequest> = serde_json::from_value(payments.clone())
                    .map_err(|e| BankError::validation(format!("invalid payments: {}", e)))?;
                serde_json::to_value(self.get_payment_messages(&payments))
                    .map_err(|e| BankError::validation(e.to_string()))
            }
            other => Err(BankError::validation(format!("unknown getter: {}", other))),
        }
    }

    pub fn balance(&self, account: &Address, asset: &AssetId) -> u64 {
        balances::get(&self.store, account, asset)
    }

    pub fn is_key_authorized(&self, owner: &Address, public_key: &VerifyingKey) -> bool {
        keys::is_authorized(&self.store, owner, &KeyHash::of(public_key))
    }

    pub fn is_nonce_used(&self, key_hash: &KeyHash, nonce: &Nonce) -> bool {
        self.store.is_nonce_used(key_hash, nonce)
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}

/// State of one trigger while it runs
struct Execution<'a, S: LedgerStore> {
    config: &'a BankConfig,
    store: Overlay<'a, S>,
    trigger: &'a Trigger,
    events: Vec<ContractEvent>,
}

impl<S: LedgerStore> Execution<'_, S> {
    fn run(&mut self, request: &Request) -> Result<Option<ResponseUnit>, BankError> {
        match request {
            Request::Deposit => self.deposit().map(|()| None),
            Request::AuthorizeKey { public_key } => self.authorize_key(public_key).map(|()| None),
            Request::RevokeKey { public_key } => self.revoke_key(public_key).map(|()| None),
            Request::Withdraw {
                asset,
                amount,
                delegation,
            } => {
                let owner = self.acting_owner(request, delegation.as_ref())?;
                self.withdraw(&owner, asset, amount, delegation.as_ref())
                    .map(Some)
            }
            Request::Transfer {
                asset,
                amount,
                to,
                delegation,
            } => {
                let owner = self.acting_owner(request, delegation.as_ref())?;
                self.transfer(&owner, asset, amount, to, delegation.as_ref())
                    .map(|()| None)
            }
            Request::Distribute {
                recipients,
                delegation,
            } => {
                let owner = self.acting_owner(request, delegation.as_ref())?;
                self.distribute(&owner, recipients, delegation.as_ref())
            }
            Request::MessageRecipients { recipients } => {
                self.message_recipients(recipients).map(|()| None)
            }
        }
    }

    fn submitter(&self) -> &Address {
        &self.trigger.address
    }

    /// The submitter itself, or the delegated owner once the signature checks out.
    fn acting_owner(
        &self,
        request: &Request,
        delegation: Option<&Delegation>,
    ) -> Result<Address, BankError> {
        let Some(delegation) = delegation else {
            return Ok(self.submitter().clone());
        };
        let action = request
            .signable()
            .ok_or_else(|| BankError::validation("operation cannot be delegated"))?;
        verifier::verify(&self.store, delegation, &action)?;
        debug!(
            trigger_id = %self.trigger.id,
            owner = %delegation.owner,
            key_hash = %delegation.key_hash,
            action = action.kind(),
            "Delegation verified"
        );
        Ok(delegation.owner.clone())
    }

    // ───────────────────────── Operations ─────────────────────────

    fn deposit(&mut self) -> Result<(), BankError> {
        let account = self.submitter().clone();
        for (asset, amount) in &self.trigger.outputs {
            if *amount == 0 {
                continue;
            }
            balances::credit(&mut self.store, &account, asset, *amount)?;
            self.events.push(ContractEvent::Deposited(Deposited {
                trigger_id: self.trigger.id,
                account: account.clone(),
                asset: asset.clone(),
                amount: *amount,
            }));
        }
        Ok(())
    }

    fn authorize_key(&mut self, public_key: &VerifyingKey) -> Result<(), BankError> {
        let owner = self.submitter().clone();
        let key_hash = keys::authorize(&mut self.store, &owner, public_key);
        self.events.push(ContractEvent::KeyAuthorized(KeyAuthorized {
            trigger_id: self.trigger.id,
            owner: owner.clone(),
            key_hash,
        }));
        self.credit_attached(&owner)
    }

    fn revoke_key(&mut self, public_key: &VerifyingKey) -> Result<(), BankError> {
        let owner = self.submitter().clone();
        let key_hash = keys::revoke(&mut self.store, &owner, public_key);
        self.events.push(ContractEvent::KeyRevoked(KeyRevoked {
            trigger_id: self.trigger.id,
            owner: owner.clone(),
            key_hash,
        }));
        self.credit_attached(&owner)
    }

    fn withdraw(
        &mut self,
        owner: &Address,
        asset: &AssetId,
        amount: &Amount,
        delegation: Option<&Delegation>,
    ) -> Result<ResponseUnit, BankError> {
        let fee = self.config.withdrawal_fee;
        let amount = if asset.is_base() {
            let available = balances::get(&self.store, owner, asset);
            let amount = match amount {
                Amount::Exact(n) => *n,
                Amount::All => match available.checked_sub(fee) {
                    Some(rest) if rest > 0 => rest,
                    _ => return Err(BankError::NotEnoughBase),
                },
            };
            let required = amount.checked_add(fee).ok_or(BankError::Overflow)?;
            balances::debit(&mut self.store, owner, asset, required)?;
            amount
        } else {
            let available = balances::get(&self.store, owner, asset);
            let amount = balances::resolve(amount, available, "nothing to withdraw")?;
            balances::debit(&mut self.store, owner, asset, amount)?;
            balances::charge_fee(&mut self.store, owner, fee)?;
            amount
        };

        let payment = PaymentRequest::new(owner.clone(), asset.clone(), amount, false);
        self.events.push(ContractEvent::Withdrawn(Withdrawn {
            trigger_id: self.trigger.id,
            owner: owner.clone(),
            recipient: owner.clone(),
            asset: asset.clone(),
            amount,
            fee,
        }));
        self.consume_nonce(delegation);
        self.credit_attached(owner)?;
        Ok(ResponseUnit {
            messages: router::external_messages(&[payment]),
        })
    }

    fn transfer(
        &mut self,
        owner: &Address,
        asset: &AssetId,
        amount: &Amount,
        to: &Address,
        delegation: Option<&Delegation>,
    ) -> Result<(), BankError> {
        let available = balances::get(&self.store, owner, asset);
        let amount = balances::resolve(amount, available, "nothing to transfer")?;
        balances::debit(&mut self.store, owner, asset, amount)?;
        balances::credit(&mut self.store, to, asset, amount)?;
        self.events.push(ContractEvent::Transferred(Transferred {
            trigger_id: self.trigger.id,
            from: owner.clone(),
            to: to.clone(),
            asset: asset.clone(),
            amount,
        }));
        self.consume_nonce(delegation);
        self.credit_attached(owner)
    }

    fn distribute(
        &mut self,
        owner: &Address,
        recipients: &[PaymentRequest],
        delegation: Option<&Delegation>,
    ) -> Result<Option<ResponseUnit>, BankError> {
        let fee = self.config.withdrawal_fee;
        let external_lines = router::external_line_count(recipients);
        let fee_total = fee.checked_mul(external_lines).ok_or(BankError::Overflow)?;

        let totals = totals_by_asset(recipients)?;
        for (asset, total) in &totals {
            if asset.is_base() {
                let required = total.checked_add(fee_total).ok_or(BankError::Overflow)?;
                balances::debit(&mut self.store, owner, asset, required)?;
            } else {
                balances::debit(&mut self.store, owner, asset, *total)?;
            }
        }
        if !totals.iter().any(|(asset, _)| asset.is_base()) {
            balances::charge_fee(&mut self.store, owner, fee_total)?;
        }

        for line in recipients {
            if line.is_aa {
                balances::credit(&mut self.store, &line.address, &line.asset, line.amount)?;
                self.events.push(ContractEvent::Credited(Credited {
                    trigger_id: self.trigger.id,
                    account: line.address.clone(),
                    asset: line.asset.clone(),
                    amount: line.amount,
                }));
            } else {
                self.events.push(ContractEvent::Withdrawn(Withdrawn {
                    trigger_id: self.trigger.id,
                    owner: owner.clone(),
                    recipient: line.address.clone(),
                    asset: line.asset.clone(),
                    amount: line.amount,
                    fee,
                }));
            }
        }
        self.consume_nonce(delegation);
        self.credit_attached(owner)?;

        if external_lines == 0 {
            return Ok(None);
        }
        Ok(Some(ResponseUnit {
            messages: router::external_messages(recipients),
        }))
    }

    fn message_recipients(&mut self, recipients: &[PaymentRequest]) -> Result<(), BankError> {
        let totals = totals_by_asset(recipients)?;
        for (asset, total) in &totals {
            let attached = self.trigger.output(asset);
            if *total > attached {
                return Err(BankError::validation(format!(
                    "recipients need {} of {} but only {} attached",
                    total, asset, attached
                )));
            }
        }

        for line in recipients {
            balances::credit(&mut self.store, &line.address, &line.asset, line.amount)?;
            self.events.push(ContractEvent::Credited(Credited {
                trigger_id: self.trigger.id,
                account: line.address.clone(),
                asset: line.asset.clone(),
                amount: line.amount,
            }));
        }

        let submitter = self.submitter().clone();
        for (asset, attached) in &self.trigger.outputs {
            let allocated = totals
                .iter()
                .find(|(a, _)| a == asset)
                .map_or(0, |(_, total)| *total);
            let remainder = attached - allocated;
            if remainder == 0 {
                continue;
            }
            balances::credit(&mut self.store, &submitter, asset, remainder)?;
            self.events.push(ContractEvent::Deposited(Deposited {
                trigger_id: self.trigger.id,
                account: submitter.clone(),
                asset: asset.clone(),
                amount: remainder,
            }));
        }
        Ok(())
    }

    // ───────────────────────── Helpers ─────────────────────────

    fn consume_nonce(&mut self, delegation: Option<&Delegation>) {
        let Some(delegation) = delegation else {
            return;
        };
        verifier::consume_nonce(&mut self.store, delegation);
        self.events.push(ContractEvent::NonceConsumed(NonceConsumed {
            trigger_id: self.trigger.id,
            key_hash: delegation.key_hash.clone(),
            nonce: delegation.nonce.clone(),
        }));
    }

    /// Value attached to an operation trigger goes to the acting owner.
    fn credit_attached(&mut self, owner: &Address) -> Result<(), BankError> {
        for (asset, amount) in &self.trigger.outputs {
            if *amount == 0 {
                continue;
            }
            balances::credit(&mut self.store, owner, asset, *amount)?;
            self.events.push(ContractEvent::Credited(Credited {
                trigger_id: self.trigger.id,
                account: owner.clone(),
                asset: asset.clone(),
                amount: *amount,
            }));
        }
        Ok(())
    }
}

/// Per-asset sums in first-seen asset order
fn totals_by_asset(lines: &[PaymentRequest]) -> Result<Vec<(AssetId, u64)>, BankError> {
    let mut totals: Vec<(AssetId, u64)> = Vec::new();
    for line in lines {
        match totals.iter_mut().find(|(asset, _)| asset == &line.asset) {
            Some((_, total)) => {
                *total = balances::checked_total([*total, line.amount])?;
            }
            None => totals.push((line.asset.clone(), line.amount)),
        }
    }
    Ok(totals)
}
