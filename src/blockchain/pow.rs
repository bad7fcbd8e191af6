use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use log::debug;

use super::block::Block;

/// Attempts between timestamp refreshes during a search
pub const REFRESH_INTERVAL: u64 = 5000;

/// Result of a completed proof of work search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The winning nonce
    pub nonce: u64,

    /// The digest satisfying the target
    pub digest: String,

    /// Number of digests computed, including the winning one
    pub attempts: u64,
}

/// Brute-force nonce search against a leading-zeros target
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    target: String,
}

impl ProofOfWork {
    /// Creates a search for digests with `difficulty` leading zeros
    pub fn new(difficulty: u32) -> Self {
        ProofOfWork {
            target: "0".repeat(difficulty as usize),
        }
    }

    /// Checks if a digest meets this search's target
    pub fn accepts(&self, digest: &str) -> bool {
        digest.starts_with(&self.target)
    }

    /// Mutates the block's nonce until its digest meets the target
    ///
    /// The search starts from the block's current nonce and never gives up.
    /// With difficulty 0 the block is accepted as-is on the first attempt.
    pub fn search(&self, block: &mut Block) -> Solution {
        let never = AtomicBool::new(false);
        loop {
            if let Some(solution) = self.search_cancellable(block, &never) {
                return solution;
            }
        }
    }

    /// Same as [`ProofOfWork::search`], but checks `cancel` before every attempt
    ///
    /// Returns `None` once the flag is raised. The block keeps whatever
    /// nonce and timestamp it had reached.
    pub fn search_cancellable(&self, block: &mut Block, cancel: &AtomicBool) -> Option<Solution> {
        let mut attempts: u64 = 0;

        loop {
            if cancel.load(Ordering::Relaxed) {
                debug!("Search for block {} cancelled after {} attempts", block.index, attempts);
                return None;
            }

            attempts += 1;
            let digest = block.digest();
            if self.accepts(&digest) {
                debug!(
                    "Block {} solved with nonce {} after {} attempts",
                    block.index, block.nonce, attempts
                );
                return Some(Solution {
                    nonce: block.nonce,
                    digest,
                    attempts,
                });
            }

            block.nonce += 1;
            if attempts % REFRESH_INTERVAL == 0 {
                block.timestamp = Utc::now();
                debug!("Still mining block {}: {} attempts", block.index, attempts);
            }
        }
    }
}
