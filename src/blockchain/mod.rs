// Blockchain module
//
// This module contains the ledger engine:
// - Block structure and digest
// - Proof of work search
// - Transaction record
// - Account balances (ledger)
// - Pending transaction pool
// - Blockchain orchestration (mining, settlement, fork demo, validation)

pub mod account;
pub mod block;
pub mod chain;
pub mod config;
pub mod pool;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use account::{Ledger, LedgerError};
pub use block::Block;
pub use chain::{BlockView, Blockchain, BlockchainError, ForkSummary, MinedBlockSummary};
pub use config::{ChainConfig, ConfigError};
pub use pool::TransactionPool;
pub use pow::{ProofOfWork, Solution};
pub use transaction::{ensure_account, Amount, Transaction, TransactionError, NETWORK};
