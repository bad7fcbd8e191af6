use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transaction::{Amount, Transaction};

/// Errors that can occur during ledger checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: String,
        required: Amount,
        available: Amount,
    },
}

/// Account balances keyed by account identifier
///
/// Unknown accounts read as 0. Balances only change through
/// [`Ledger::settle`], which trusts that admission already happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<String, Amount>,
}

impl Ledger {
    /// Creates a ledger seeding every account with the same balance
    ///
    /// # Arguments
    ///
    /// * `accounts` - The accounts to open
    /// * `initial_balance` - The balance each account starts with
    pub fn with_accounts<I, S>(accounts: I, initial_balance: Amount) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ledger {
            balances: accounts
                .into_iter()
                .map(|account| (account.into(), initial_balance))
                .collect(),
        }
    }

    /// Gets an account's balance, 0 if the account is unknown
    pub fn balance(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Checks that `account` can cover `amount` from its settled balance
    pub fn ensure_funds(&self, account: &str, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.to_string(),
                required: amount,
                available,
            });
        }

        Ok(())
    }

    /// Adds `amount` to an account, opening it at 0 if absent
    pub fn credit(&mut self, account: &str, amount: Amount) {
        *self.balances.entry(account.to_string()).or_insert(0) += amount;
    }

    /// Subtracts `amount` from an account, opening it at 0 if absent
    pub fn debit(&mut self, account: &str, amount: Amount) {
        *self.balances.entry(account.to_string()).or_insert(0) -= amount;
    }

    /// Applies a transaction: debits the sender unless it is the network,
    /// then credits the recipient
    pub fn settle(&mut self, transaction: &Transaction) {
        if !transaction.is_reward() {
            self.debit(&transaction.sender, transaction.amount);
        }
        self.credit(&transaction.recipient, transaction.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_creation() {
        let ledger = Ledger::with_accounts(["Alice", "Bob"], 100);

        assert_eq!(ledger.balance("Alice"), 100);
        assert_eq!(ledger.balance("Bob"), 100);
        assert_eq!(ledger.balance("Mallory"), 0);
    }

    #[test]
    fn test_ensure_funds() {
        let ledger = Ledger::with_accounts(["Alice"], 100);

        assert!(ledger.ensure_funds("Alice", 100).is_ok());
        assert_eq!(
            ledger.ensure_funds("Alice", 150),
            Err(LedgerError::InsufficientBalance {
                account: "Alice".to_string(),
                required: 150,
                available: 100,
            })
        );
        assert!(ledger.ensure_funds("Mallory", 1).is_err());
    }

    #[test]
    fn test_settle_transfer() {
        let mut ledger = Ledger::with_accounts(["Alice", "Bob"], 100);

        ledger.settle(&Transaction::new("Alice", "Bob", 30));

        assert_eq!(ledger.balance("Alice"), 70);
        assert_eq!(ledger.balance("Bob"), 130);
    }

    #[test]
    fn test_settle_reward_opens_account() {
        let mut ledger = Ledger::with_accounts(["Alice"], 100);

        ledger.settle(&Transaction::reward("Miner1", 50));

        assert_eq!(ledger.balance("Miner1"), 50);
        assert_eq!(ledger.balance("Alice"), 100);
        assert_eq!(ledger.balance(crate::blockchain::NETWORK), 0);
    }

    #[test]
    fn test_settlement_trusts_admission() {
        let mut ledger = Ledger::with_accounts(["Alice", "Bob"], 100);

        ledger.settle(&Transaction::new("Alice", "Bob", 80));
        ledger.settle(&Transaction::new("Alice", "Bob", 80));

        assert_eq!(ledger.balance("Alice"), -60);
        assert_eq!(ledger.balance("Bob"), 260);
    }
}
