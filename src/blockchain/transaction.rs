use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved sender identifier for minted rewards
pub const NETWORK: &str = "NETWORK";

/// Signed integer amount used for transfers and balances
pub type Amount = i64;

/// Errors that make a transaction inadmissible
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Sender and recipient cannot be the same: {0}")]
    SelfTransfer(String),

    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(Amount),

    #[error("Reserved identifier cannot be used as an account: {0}")]
    ReservedIdentifier(String),
}

/// Represents a transfer between two accounts
///
/// Field order is part of the block digest, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's account identifier, or `NETWORK` for a minted reward
    pub sender: String,

    /// Recipient's account identifier
    pub recipient: String,

    /// Amount being transferred
    pub amount: Amount,
}

impl Transaction {
    /// Creates a new transfer
    ///
    /// # Arguments
    ///
    /// * `sender` - The account paying
    /// * `recipient` - The account being paid
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Amount) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Creates a reward transaction minted by the network
    pub fn reward(miner: impl Into<String>, amount: Amount) -> Self {
        Transaction::new(NETWORK, miner, amount)
    }

    /// Checks if the transaction mints new coins
    pub fn is_reward(&self) -> bool {
        self.sender == NETWORK
    }

    /// Checks the transaction's shape, independent of any balance
    ///
    /// Only rewards built by the chain itself may name `NETWORK`.
    pub fn validate(&self) -> Result<(), TransactionError> {
        ensure_account(&self.sender)?;
        ensure_account(&self.recipient)?;

        if self.sender == self.recipient {
            return Err(TransactionError::SelfTransfer(self.sender.clone()));
        }

        if self.amount <= 0 {
            return Err(TransactionError::NonPositiveAmount(self.amount));
        }

        Ok(())
    }
}

/// Checks that an identifier may hold a balance or receive a reward
pub fn ensure_account(account: &str) -> Result<(), TransactionError> {
    if account == NETWORK {
        return Err(TransactionError::ReservedIdentifier(account.to_string()));
    }

    Ok(())
}
