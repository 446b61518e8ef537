//! # Account Ledger
//!
//! The fixed set of balances the assistant can answer questions about.
//! A ledger is built once from configuration and never changes afterwards;
//! there are no setters, so sharing it between request handlers needs no lock.

use crate::config::LedgerConfig;
use serde::Serialize;

/// The two accounts the assistant knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    Checking,
    Savings,
}

impl Account {
    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Checking => "checking",
            Account::Savings => "savings",
        }
    }
}

/// Immutable mapping of account name to balance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLedger {
    checking: f64,
    savings: f64,
}

impl AccountLedger {
    pub fn new(checking: f64, savings: f64) -> Self {
        Self { checking, savings }
    }

    pub fn balance(&self, account: Account) -> f64 {
        match account {
            Account::Checking => self.checking,
            Account::Savings => self.savings,
        }
    }

    /// Balance rendered the way replies quote it: two decimal places, no separators.
    pub fn formatted_balance(&self, account: Account) -> String {
        format!("{:.2}", self.balance(account))
    }

    pub fn accounts(&self) -> [Account; 2] {
        [Account::Checking, Account::Savings]
    }
}

impl Default for AccountLedger {
    fn default() -> Self {
        Self::new(2540.34, 10420.76)
    }
}

impl From<&LedgerConfig> for AccountLedger {
    fn from(config: &LedgerConfig) -> Self {
        Self::new(config.checking, config.savings)
    }
}
