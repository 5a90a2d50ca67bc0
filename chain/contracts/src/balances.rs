//! Balance Store operations
//!
//! Checked credit/debit on top of a [`LedgerStore`]. A balance can never go
//! negative and never wrap: a debit larger than the balance is rejected and a
//! credit that would overflow `u64` is rejected.

use bank_types::amount::Amount;
use bank_types::ids::{Address, AssetId};

use crate::errors::BankError;
use crate::store::LedgerStore;

/// Current balance, 0 when the account never held the asset.
pub fn get<S: LedgerStore + ?Sized>(store: &S, account: &Address, asset: &AssetId) -> u64 {
    store.balance(account, asset)
}

/// Increase a balance. Crediting 0 writes nothing.
pub fn credit<S: LedgerStore + ?Sized>(
    store: &mut S,
    account: &Address,
    asset: &AssetId,
    amount: u64,
) -> Result<(), BankError> {
    if amount == 0 {
        return Ok(());
    }
    let current = store.balance(account, asset);
    let updated = current.checked_add(amount).ok_or(BankError::Overflow)?;
    store.set_balance(account, asset, updated);
    Ok(())
}

/// Decrease a balance by exactly `amount`.
///
/// `amount` is the full required total (including any fee folded in by the
/// caller) so the error reports the numbers the user actually compared.
pub fn debit<S: LedgerStore + ?Sized>(
    store: &mut S,
    account: &Address,
    asset: &AssetId,
    amount: u64,
) -> Result<(), BankError> {
    let available = store.balance(account, asset);
    if amount > available {
        return Err(BankError::InsufficientBalance {
            required: amount,
            available,
        });
    }
    store.set_balance(account, asset, available - amount);
    Ok(())
}

/// Take a fee from the base balance when base is not the asset being paid.
pub fn charge_fee<S: LedgerStore + ?Sized>(
    store: &mut S,
    account: &Address,
    fee: u64,
) -> Result<(), BankError> {
    if fee == 0 {
        return Ok(());
    }
    debit(store, account, &AssetId::Base, fee).map_err(|_| BankError::NotEnoughBase)
}

/// Resolve an amount against an available balance.
///
/// `All` becomes the whole balance; a whole balance of zero is rejected
/// with `empty`, since there is nothing to move.
pub fn resolve(amount: &Amount, available: u64, empty: &str) -> Result<u64, BankError> {
    match amount {
        Amount::Exact(n) => Ok(*n),
        Amount::All if available == 0 => Err(BankError::validation(empty)),
        Amount::All => Ok(available),
    }
}

/// Sum of amounts, failing instead of wrapping.
pub fn checked_total(amounts: impl IntoIterator<Item = u64>) -> Result<u64, BankError> {
    amounts
        .into_iter()
        .try_fold(0u64, |acc, a| acc.checked_add(a))
        .ok_or(BankError::Overflow)
}
