use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::transaction::Transaction;

/// Length in hex characters of a block digest
pub const DIGEST_LEN: usize = 64;

/// Represents a block in the blockchain
///
/// A block is a plain data holder: it hashes itself but never validates
/// itself. Any field mutation invalidates a previously computed digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Digest of the previous block
    pub previous_digest: String,

    /// List of transactions included in this block
    pub transactions: Vec<Transaction>,

    /// Leading zero hex characters required of the digest
    pub difficulty: u32,

    /// Proof of work search variable
    pub nonce: u64,

    /// Timestamp when the block was created or last refreshed
    pub timestamp: DateTime<Utc>,
}

impl Block {
    /// Creates a new, unmined block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `previous_digest` - The digest of the previous block
    /// * `transactions` - The list of transactions to include in the block
    /// * `difficulty` - The number of leading zeros its digest must carry
    ///
    /// # Returns
    ///
    /// A new Block instance with nonce 0
    pub fn new(
        index: u64,
        previous_digest: String,
        transactions: Vec<Transaction>,
        difficulty: u32,
    ) -> Self {
        Block::with_timestamp(index, previous_digest, transactions, difficulty, Utc::now())
    }

    /// Creates a new, unmined block with an explicit timestamp
    pub fn with_timestamp(
        index: u64,
        previous_digest: String,
        transactions: Vec<Transaction>,
        difficulty: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Block {
            index,
            previous_digest,
            transactions,
            difficulty,
            nonce: 0,
            timestamp,
        }
    }

    /// Creates the genesis block (first block in the chain)
    pub fn genesis(difficulty: u32) -> Self {
        Block::new(0, genesis_digest(), Vec::new(), difficulty)
    }

    /// Canonical serialization the digest is computed over
    ///
    /// `json!` objects keep their keys sorted, so identical field values
    /// always serialize to identical text.
    pub fn header(&self) -> String {
        serde_json::json!({
            "index": self.index,
            "previous_digest": self.previous_digest,
            "transactions": self.transactions,
            "difficulty": self.difficulty,
            "nonce": self.nonce,
            "timestamp": self.timestamp,
        })
        .to_string()
    }

    /// Calculates the digest of the block
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the canonical header as a lowercase hexadecimal string
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.header().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Sentinel previous digest referenced by the genesis block
pub fn genesis_digest() -> String {
    "0".repeat(DIGEST_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_block() -> Block {
        Block::with_timestamp(
            1,
            genesis_digest(),
            vec![
                Transaction::new("Alice", "Bob", 30),
                Transaction::reward("Bob", 50),
            ],
            2,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_block() {
        let block = Block::new(3, "previous".to_string(), Vec::new(), 1);

        assert_eq!(block.index, 3);
        assert_eq!(block.nonce, 0);
        assert_eq!(block.difficulty, 1);
        assert_eq!(block.previous_digest, "previous");
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis(3);

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_digest, "0".repeat(64));
        assert!(genesis.transactions.is_empty());
    }

    #[test]
    fn test_digest_is_deterministic() {
        let block = sample_block();
        let digest = block.digest();

        assert_eq!(digest, block.digest());
        assert_eq!(digest, block.clone().digest());
        assert_eq!(digest.len(), DIGEST_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_changes_with_every_field() {
        let base = sample_block();
        let digest = base.digest();

        let mut block = base.clone();
        block.index += 1;
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.previous_digest = "1".repeat(DIGEST_LEN);
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.transactions.push(Transaction::new("Carol", "Dave", 1));
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.transactions.swap(0, 1);
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.difficulty += 1;
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.nonce += 1;
        assert_ne!(digest, block.digest());

        let mut block = base.clone();
        block.timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap();
        assert_ne!(digest, block.digest());
    }

    #[test]
    fn test_header_has_sorted_keys() {
        let header = sample_block().header();
        let difficulty = header.find("\"difficulty\"").unwrap();
        let index = header.find("\"index\"").unwrap();
        let transactions = header.find("\"transactions\"").unwrap();

        assert!(difficulty < index);
        assert!(index < transactions);
    }
}
