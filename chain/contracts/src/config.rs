//! Bank configuration

use bank_types::ids::Address;
use serde::{Deserialize, Serialize};

use crate::errors::BankError;

/// Default fee per external payment line, in base units
pub const DEFAULT_WITHDRAWAL_FEE: u64 = 2000;

/// Default limit on recipients per batch (outputs per ledger message)
pub const DEFAULT_MAX_RECIPIENTS: usize = 128;

/// Configuration of one bank instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// This instance's own address; buffered payments are sent here.
    pub bank_address: Address,
    /// Charged in base for every external payment line.
    #[serde(default = "default_withdrawal_fee")]
    pub withdrawal_fee: u64,
    /// Maximum number of recipients in one request.
    #[serde(default = "default_max_recipients")]
    pub max_recipients: usize,
}

fn default_withdrawal_fee() -> u64 {
    DEFAULT_WITHDRAWAL_FEE
}

fn default_max_recipients() -> usize {
    DEFAULT_MAX_RECIPIENTS
}

impl BankConfig {
    /// Configuration with default fee and limits.
    pub fn new(bank_address: Address) -> Self {
        Self {
            bank_address,
            withdrawal_fee: DEFAULT_WITHDRAWAL_FEE,
            max_recipients: DEFAULT_MAX_RECIPIENTS,
        }
    }

    pub fn with_withdrawal_fee(mut self, fee: u64) -> Self {
        self.withdrawal_fee = fee;
        self
    }

    pub fn with_max_recipients(mut self, max: usize) -> Self {
        self.max_recipients = max;
        self
    }

    /// Load from a JSON document and validate.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let config: BankConfig = serde_json::from_str(json)
            .map_err(|e| BankError::validation(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        if self.max_recipients == 0 {
            return Err(BankError::validation("invalid config: max_recipients must be positive"));
        }
        Ok(())
    }
}
