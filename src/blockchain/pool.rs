use log::debug;

use super::account::Ledger;
use super::chain::BlockchainError;
use super::transaction::{Amount, Transaction};

/// Pending transactions awaiting inclusion in a block, in arrival order
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        TransactionPool::default()
    }

    /// Admits a transfer against the ledger's settled balances
    ///
    /// Pending transfers already in the pool are not deducted, so a sender
    /// can over-commit across several transfers before the next block.
    ///
    /// # Arguments
    ///
    /// * `sender` - The account paying
    /// * `recipient` - The account being paid
    /// * `amount` - The amount to transfer
    /// * `ledger` - The settled balances to check against
    ///
    /// # Returns
    ///
    /// The admitted transaction
    pub fn submit(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
        ledger: &Ledger,
    ) -> Result<&Transaction, BlockchainError> {
        let transaction = Transaction::new(sender, recipient, amount);
        transaction.validate()?;
        ledger.ensure_funds(sender, amount)?;

        debug!("Queued transaction {} -> {} : {}", sender, recipient, amount);
        self.pending.push(transaction);

        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Gets the pending transactions in arrival order
    pub fn transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Removes and returns every pending transaction
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::TransactionError;

    fn ledger() -> Ledger {
        Ledger::with_accounts(["Alice", "Bob"], 100)
    }

    #[test]
    fn test_submit_keeps_arrival_order() {
        let ledger = ledger();
        let mut pool = TransactionPool::new();

        pool.submit("Alice", "Bob", 30, &ledger).unwrap();
        pool.submit("Bob", "Alice", 10, &ledger).unwrap();

        assert_eq!(
            pool.transactions(),
            &[
                Transaction::new("Alice", "Bob", 30),
                Transaction::new("Bob", "Alice", 10),
            ]
        );
        // Admission never touches balances
        assert_eq!(ledger.balance("Alice"), 100);
    }

    #[test]
    fn test_rejects_over_spend() {
        let ledger = ledger();
        let mut pool = TransactionPool::new();

        let result = pool.submit("Alice", "Bob", 150, &ledger);

        assert!(matches!(
            result,
            Err(BlockchainError::InsufficientBalance { required: 150, available: 100, .. })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_rejects_self_transfer_and_non_positive() {
        let ledger = ledger();
        let mut pool = TransactionPool::new();

        assert!(matches!(
            pool.submit("Alice", "Alice", 10, &ledger),
            Err(BlockchainError::InvalidTransaction(TransactionError::SelfTransfer(_)))
        ));
        assert!(matches!(
            pool.submit("Alice", "Bob", 0, &ledger),
            Err(BlockchainError::InvalidTransaction(TransactionError::NonPositiveAmount(0)))
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pending_transfers_are_not_deducted() {
        let ledger = ledger();
        let mut pool = TransactionPool::new();

        pool.submit("Alice", "Bob", 80, &ledger).unwrap();
        pool.submit("Alice", "Bob", 80, &ledger).unwrap();

        assert_eq!(pool.transactions().len(), 2);
    }

    #[test]
    fn test_drain_empties_pool() {
        let ledger = ledger();
        let mut pool = TransactionPool::new();
        pool.submit("Alice", "Bob", 30, &ledger).unwrap();

        let drained = pool.drain();

        assert_eq!(drained.len(), 1);
        assert!(pool.is_empty());
    }
}
