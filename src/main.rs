use anyhow::{Context, Result};
use log::{info, warn};

use classroom_chain::blockchain::{Blockchain, BlockchainError, ChainConfig};

// Load the classroom profile from the JSON file given as the first argument,
// or fall back to the built-in defaults
fn load_config() -> Result<ChainConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config = ChainConfig::from_json(&json)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            info!("Loaded classroom profile from {}", path);
            Ok(config)
        }
        None => Ok(ChainConfig::default()),
    }
}

// Walk through one classroom session: bootstrap, transfer, mine, fork, validate
fn run_session(blockchain: &mut Blockchain) -> Result<()> {
    let accounts = blockchain.accounts().to_vec();
    let (first, second) = match accounts.as_slice() {
        [first, second, ..] => (first.clone(), second.clone()),
        _ => anyhow::bail!("The classroom needs at least two accounts"),
    };

    // Bootstrap until the currency sustains itself
    while !blockchain.is_self_sustaining() && blockchain.config().reward > 0 {
        blockchain.mine(&first)?;
    }

    match blockchain.mine(&first) {
        Err(BlockchainError::NoPendingTransactions) => {
            info!("Empty-pool mining refused once bootstrapping ended")
        }
        other => warn!("Unexpected mining outcome: {:?}", other.map(|summary| summary.digest)),
    }

    blockchain.submit_transaction(&first, &second, 30)?;
    if let Err(err) = blockchain.submit_transaction(&second, &second, 5) {
        info!("Rejected as expected: {}", err);
    }
    let mined = blockchain.mine(&second)?;
    info!(
        "Block {} holds {} transactions",
        mined.block.index,
        mined.block.transactions.len()
    );

    blockchain.submit_transaction(&second, &first, 10)?;
    let fork = blockchain.simulate_fork("Miner1", "Miner2")?;
    info!("Fork won by {}, {} abandoned", fork.winner, fork.abandoned_miner);

    info!("Balances:");
    for (account, balance) in blockchain.balances() {
        info!("  {}: {}", account, balance);
    }
    info!("  Miner1: {}", blockchain.balance_of("Miner1"));

    for view in blockchain.chain_snapshot() {
        info!(
            "Block {}: hash {}... | prev {}...",
            view.index, view.digest_prefix, view.previous_digest_prefix
        );
        info!("  Transactions: {}", serde_json::to_string(&view.transactions)?);
    }

    info!("Blockchain valid? {}", blockchain.is_valid());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = load_config()?;
    let mut blockchain = Blockchain::new(config)?;

    run_session(&mut blockchain)
}
