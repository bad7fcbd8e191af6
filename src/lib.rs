//! A classroom proof-of-work ledger: a chain of blocks, a pending
//! transaction pool, account balances, and a scripted two-miner fork.

pub mod blockchain;
