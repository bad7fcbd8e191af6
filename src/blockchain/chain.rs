use std::thread;

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::account::{Ledger, LedgerError};
use super::block::Block;
use super::config::{ChainConfig, ConfigError};
use super::pool::TransactionPool;
use super::pow::ProofOfWork;
use super::transaction::{ensure_account, Amount, Transaction, TransactionError};

/// Hex characters of a block digest shown in chain views
const DIGEST_PREFIX_LEN: usize = 20;

/// Hex characters of a previous-block digest shown in chain views
const PREVIOUS_PREFIX_LEN: usize = 10;

/// Errors that can occur during blockchain operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] TransactionError),

    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: String,
        required: Amount,
        available: Amount,
    },

    #[error("No pending transactions")]
    NoPendingTransactions,

    #[error("Invalid chain: {0}")]
    InvalidChain(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl From<LedgerError> for BlockchainError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                account,
                required,
                available,
            } => BlockchainError::InsufficientBalance {
                account,
                required,
                available,
            },
        }
    }
}

/// Outcome of a successful `mine` call
#[derive(Debug, Clone, Serialize)]
pub struct MinedBlockSummary {
    /// The block appended to the chain
    pub block: Block,

    /// Digest of the appended block
    pub digest: String,

    /// The account credited with the reward
    pub miner: String,

    /// Digests computed before the target was met
    pub attempts: u64,

    /// Total minted after settlement
    pub total_minted: Amount,

    /// True when this block ended the bootstrap phase
    pub bootstrap_completed: bool,
}

/// Outcome of a fork demonstration
#[derive(Debug, Clone, Serialize)]
pub struct ForkSummary {
    /// Miner whose block was appended
    pub winner: String,

    /// The appended block
    pub block: Block,

    /// Digest of the appended block
    pub digest: String,

    /// Miner whose block was thrown away
    pub abandoned_miner: String,

    /// Digest of the thrown-away block
    pub abandoned_digest: String,

    /// Total minted after the winner's reward
    pub total_minted: Amount,
}

/// Display view of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockView {
    pub index: u64,
    pub digest_prefix: String,
    pub previous_digest_prefix: String,
    pub transactions: Vec<Transaction>,
}

/// Represents the blockchain
///
/// Owns the chain, the balance ledger, and the pool of pending transactions.
/// A block is only ever appended together with its settlement.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, genesis first
    chain: Vec<Block>,

    /// Settled account balances
    ledger: Ledger,

    /// Transactions to be included in the next block
    pool: TransactionPool,

    /// Sum of every reward ever settled
    total_minted: Amount,

    /// Search applied to every mined block
    pow: ProofOfWork,

    config: ChainConfig,
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block
    ///
    /// # Arguments
    ///
    /// * `config` - Accounts, balances, reward, and difficulty for this instance
    ///
    /// # Returns
    ///
    /// A new Blockchain instance, or `InvalidConfig` if the config is rejected
    pub fn new(config: ChainConfig) -> Result<Self, BlockchainError> {
        config.validate()?;

        let genesis = Block::genesis(config.difficulty);
        let ledger = Ledger::with_accounts(config.accounts.iter().cloned(), config.initial_balance);

        info!(
            "Created blockchain with {} accounts at {} each (difficulty {})",
            config.accounts.len(),
            config.initial_balance,
            config.difficulty
        );

        Ok(Blockchain {
            chain: vec![genesis],
            ledger,
            pool: TransactionPool::new(),
            total_minted: 0,
            pow: ProofOfWork::new(config.difficulty),
            config,
        })
    }

    /// Creates a blockchain for the given accounts, other settings at their defaults
    pub fn with_accounts<I, S>(
        accounts: I,
        initial_balance: Amount,
    ) -> Result<Self, BlockchainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Blockchain::new(
            ChainConfig::default()
                .with_accounts(accounts)
                .with_initial_balance(initial_balance),
        )
    }

    /// Adds a new transaction to the pending transactions
    ///
    /// The sender is checked against its settled balance only.
    pub fn submit_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
    ) -> Result<(), BlockchainError> {
        match self.pool.submit(sender, recipient, amount, &self.ledger) {
            Ok(transaction) => {
                info!(
                    "Transaction added: {} -> {} : {}",
                    transaction.sender, transaction.recipient, transaction.amount
                );
                Ok(())
            }
            Err(err) => {
                warn!("Rejected transaction {} -> {} : {}: {}", sender, recipient, amount, err);
                Err(err)
            }
        }
    }

    /// Mines a new block with the pending transactions
    ///
    /// With an empty pool a reward-only block is mined while the chain is
    /// still bootstrapping; afterwards an empty pool is refused.
    ///
    /// # Arguments
    ///
    /// * `miner` - The account to receive the mining reward
    ///
    /// # Returns
    ///
    /// Result with a summary of the newly mined block
    pub fn mine(&mut self, miner: &str) -> Result<MinedBlockSummary, BlockchainError> {
        ensure_account(miner)?;

        if self.pool.is_empty() {
            if self.is_self_sustaining() {
                warn!("No pending transactions. Mining paused until new transactions arrive");
                return Err(BlockchainError::NoPendingTransactions);
            }
            info!("Bootstrapping: mining reward-only block for {}", miner);
        }

        let pending = self.pool.drain();
        let mut block = self.candidate(self.with_reward(&pending, miner));
        let solution = self.pow.search(&mut block);

        let was_self_sustaining = self.is_self_sustaining();
        self.chain.push(block.clone());

        for transaction in &block.transactions {
            self.ledger.settle(transaction);
        }
        self.total_minted += block
            .transactions
            .iter()
            .filter(|transaction| transaction.is_reward())
            .map(|transaction| transaction.amount)
            .sum::<Amount>();

        let bootstrap_completed = !was_self_sustaining && self.is_self_sustaining();

        info!(
            "Block {} mined by {} after {} guesses: {}...",
            block.index,
            miner,
            solution.attempts,
            prefix(&solution.digest, DIGEST_PREFIX_LEN)
        );
        info!("Total coins mined: {}", self.total_minted);
        if bootstrap_completed {
            info!("Currency is now self-sustaining. Future mining requires transactions");
        }

        Ok(MinedBlockSummary {
            block,
            digest: solution.digest,
            miner: miner.to_string(),
            attempts: solution.attempts,
            total_minted: self.total_minted,
            bootstrap_completed,
        })
    }

    /// Runs two miners over the same pending transactions and keeps one block
    ///
    /// Both searches run on their own threads, but `miner_a` always wins.
    /// Only the winner's reward is settled: the transfers carried in the
    /// winning block are recorded on the chain without touching balances.
    /// The pool is drained either way and its transfers are not re-queued.
    pub fn simulate_fork(
        &mut self,
        miner_a: &str,
        miner_b: &str,
    ) -> Result<ForkSummary, BlockchainError> {
        ensure_account(miner_a)?;
        ensure_account(miner_b)?;

        if self.pool.is_empty() {
            warn!("No pending transactions for fork demo");
            return Err(BlockchainError::NoPendingTransactions);
        }

        let pending = self.pool.drain();
        let mut block_a = self.candidate(self.with_reward(&pending, miner_a));
        let mut block_b = self.candidate(self.with_reward(&pending, miner_b));

        info!("{} and {} are mining block {}...", miner_a, miner_b, block_a.index);
        let pow = &self.pow;
        // Unjoined scoped threads are joined when the scope ends
        let solution_a = thread::scope(|scope| {
            scope.spawn(|| {
                pow.search(&mut block_b);
            });
            pow.search(&mut block_a)
        });
        let abandoned_digest = block_b.digest();
        debug!(
            "Fork searches finished: {} took {} guesses, {} stopped at nonce {}",
            miner_a, solution_a.attempts, miner_b, block_b.nonce
        );

        self.chain.push(block_a.clone());
        self.ledger.credit(miner_a, self.config.reward);
        self.total_minted += self.config.reward;

        info!(
            "{}'s block appended to the chain: {}...",
            miner_a,
            prefix(&solution_a.digest, DIGEST_PREFIX_LEN)
        );
        info!(
            "{}'s block is abandoned due to fork resolution: {}...",
            miner_b,
            prefix(&abandoned_digest, DIGEST_PREFIX_LEN)
        );

        Ok(ForkSummary {
            winner: miner_a.to_string(),
            block: block_a,
            digest: solution_a.digest,
            abandoned_miner: miner_b.to_string(),
            abandoned_digest,
            total_minted: self.total_minted,
        })
    }

    /// Validates the blockchain, reporting the first broken block
    pub fn validate(&self) -> Result<(), BlockchainError> {
        for pair in self.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);

            if current.previous_digest != previous.digest() {
                return Err(BlockchainError::InvalidChain(format!(
                    "block {} does not link to block {}",
                    current.index, previous.index
                )));
            }

            if !ProofOfWork::new(current.difficulty).accepts(&current.digest()) {
                return Err(BlockchainError::InvalidChain(format!(
                    "block {} does not meet difficulty {}",
                    current.index, current.difficulty
                )));
            }
        }

        Ok(())
    }

    /// Validates the blockchain
    ///
    /// # Returns
    ///
    /// true if the blockchain is valid, false otherwise
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }

    /// Gets an account's settled balance, 0 if unknown
    pub fn balance_of(&self, account: &str) -> Amount {
        self.ledger.balance(account)
    }

    /// Gets the configured accounts with their balances, in configuration order
    pub fn balances(&self) -> Vec<(String, Amount)> {
        self.config
            .accounts
            .iter()
            .map(|account| (account.clone(), self.ledger.balance(account)))
            .collect()
    }

    /// Gets display views of every block, genesis first
    pub fn chain_snapshot(&self) -> Vec<BlockView> {
        self.chain
            .iter()
            .map(|block| BlockView {
                index: block.index,
                digest_prefix: prefix(&block.digest(), DIGEST_PREFIX_LEN).to_string(),
                previous_digest_prefix: prefix(&block.previous_digest, PREVIOUS_PREFIX_LEN)
                    .to_string(),
                transactions: block.transactions.clone(),
            })
            .collect()
    }

    /// Gets the entire blockchain
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> &Block {
        // The genesis block is never removed
        &self.chain[self.chain.len() - 1]
    }

    /// Gets all pending transactions
    pub fn pending_transactions(&self) -> &[Transaction] {
        self.pool.transactions()
    }

    pub fn accounts(&self) -> &[String] {
        &self.config.accounts
    }

    pub fn total_minted(&self) -> Amount {
        self.total_minted
    }

    /// True once minted rewards reach the bootstrap amount
    pub fn is_self_sustaining(&self) -> bool {
        self.total_minted >= self.config.bootstrap_amount
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Builds an unmined block on top of the current tip
    fn candidate(&self, transactions: Vec<Transaction>) -> Block {
        Block::new(
            self.chain.len() as u64,
            self.last_block().digest(),
            transactions,
            self.config.difficulty,
        )
    }

    /// Pending transfers in arrival order followed by the miner's reward
    fn with_reward(&self, pending: &[Transaction], miner: &str) -> Vec<Transaction> {
        let mut transactions = pending.to_vec();
        transactions.push(Transaction::reward(miner, self.config.reward));
        transactions
    }
}

fn prefix(digest: &str, len: usize) -> &str {
    digest.get(..len).unwrap_or(digest)
}
