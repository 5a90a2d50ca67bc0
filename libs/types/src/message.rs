//! Canonical signing messages for delegated calls
//!
//! A third party may submit a withdraw, transfer or distribute on an owner's
//! behalf when the request carries a signature, made with a key the owner
//! has authorized, over the text produced here. Verifier and signer must
//! build the text from this module only; changing a template is a breaking
//! protocol change and requires bumping `PROTOCOL_VERSION`.

use crate::amount::Amount;
use crate::ids::{Address, AssetId, Nonce};
use crate::payment::PaymentRequest;

/// Signing template version (frozen).
pub const PROTOCOL_VERSION: &str = "1";

/// The semantic fields of an operation that a delegated signature covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignableAction<'a> {
    Withdraw {
        amount: &'a Amount,
        asset: &'a AssetId,
    },
    Transfer {
        amount: &'a Amount,
        asset: &'a AssetId,
        to: &'a Address,
    },
    Distribute {
        recipients: &'a [PaymentRequest],
    },
}

impl SignableAction<'_> {
    /// Build the exact text to be signed for this action and nonce.
    ///
    /// - withdraw: `withdraw <amount> <asset> to self with nonce <nonce>`
    /// - transfer: `transfer <amount> <asset> to <to> with nonce <nonce>`
    /// - distribute: `withdraw to <line>, <line> with nonce <nonce>` where a
    ///   line is `<amount> <asset> to <address>`, suffixed with ` via bank`
    ///   for contract recipients
    pub fn message(&self, nonce: &Nonce) -> String {
        match self {
            SignableAction::Withdraw { amount, asset } => {
                format!("withdraw {} {} to self with nonce {}", amount, asset, nonce)
            }
            SignableAction::Transfer { amount, asset, to } => {
                format!("transfer {} {} to {} with nonce {}", amount, asset, to, nonce)
            }
            SignableAction::Distribute { recipients } => {
                let mut text = String::from("withdraw to ");
                for (i, r) in recipients.iter().enumerate() {
                    if i > 0 {
                        text.push_str(", ");
                    }
                    text.push_str(&format!("{} {} to {}", r.amount, r.asset, r.address));
                    if r.is_aa {
                        text.push_str(" via bank");
                    }
                }
                text.push_str(&format!(" with nonce {}", nonce));
                text
            }
        }
    }

    /// UTF-8 bytes of [`message`](Self::message)
    pub fn canonical_bytes(&self, nonce: &Nonce) -> Vec<u8> {
        self.message(nonce).into_bytes()
    }

    /// Short operation name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SignableAction::Withdraw { .. } => "withdraw",
            SignableAction::Transfer { .. } => "transfer",
            SignableAction::Distribute { .. } => "distribute",
        }
    }
}
