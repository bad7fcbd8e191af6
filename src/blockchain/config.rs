use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transaction::{Amount, NETWORK};

/// Errors that can occur while loading or checking a configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Reward must not be negative: {0}")]
    NegativeReward(Amount),

    #[error("Initial balance must not be negative: {0}")]
    NegativeInitialBalance(Amount),

    #[error("Bootstrap amount must not be negative: {0}")]
    NegativeBootstrapAmount(Amount),

    #[error("Reserved identifier cannot be an account: {0}")]
    ReservedAccount(String),
}

/// Construction-time parameters of a blockchain instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Accounts opened at genesis
    pub accounts: Vec<String>,

    /// Balance each account starts with
    pub initial_balance: Amount,

    /// Minted total below which reward-only blocks may be mined
    pub bootstrap_amount: Amount,

    /// Reward minted per mined block
    pub reward: Amount,

    /// Leading zero hex characters required of every mined block
    pub difficulty: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            accounts: ["Alice", "Bob", "Carol", "Dave", "Eve"]
                .into_iter()
                .map(String::from)
                .collect(),
            initial_balance: 100,
            bootstrap_amount: 200,
            reward: 50,
            difficulty: 3,
        }
    }
}

impl ChainConfig {
    /// Loads a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ChainConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that amounts are non-negative and no account is reserved
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward < 0 {
            return Err(ConfigError::NegativeReward(self.reward));
        }

        if self.initial_balance < 0 {
            return Err(ConfigError::NegativeInitialBalance(self.initial_balance));
        }

        if self.bootstrap_amount < 0 {
            return Err(ConfigError::NegativeBootstrapAmount(self.bootstrap_amount));
        }

        if let Some(account) = self.accounts.iter().find(|account| *account == NETWORK) {
            return Err(ConfigError::ReservedAccount(account.clone()));
        }

        Ok(())
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_initial_balance(mut self, initial_balance: Amount) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    pub fn with_bootstrap_amount(mut self, bootstrap_amount: Amount) -> Self {
        self.bootstrap_amount = bootstrap_amount;
        self
    }

    pub fn with_reward(mut self, reward: Amount) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();

        assert_eq!(config.accounts, vec!["Alice", "Bob", "Carol", "Dave", "Eve"]);
        assert_eq!(config.initial_balance, 100);
        assert_eq!(config.bootstrap_amount, 200);
        assert_eq!(config.reward, 50);
        assert_eq!(config.difficulty, 3);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ChainConfig::from_json(r#"{"accounts": ["Ann", "Ben"], "difficulty": 1}"#).unwrap();

        assert_eq!(config.accounts, vec!["Ann", "Ben"]);
        assert_eq!(config.difficulty, 1);
        assert_eq!(config.reward, 50);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ChainConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_negative_reward() {
        assert_eq!(
            ChainConfig::from_json(r#"{"reward": -50}"#),
            Err(ConfigError::NegativeReward(-50))
        );
    }

    #[test]
    fn test_validate() {
        assert!(ChainConfig::default().validate().is_ok());
        assert!(ChainConfig::default().with_reward(0).validate().is_ok());
        assert_eq!(
            ChainConfig::default().with_reward(-1).validate(),
            Err(ConfigError::NegativeReward(-1))
        );
        assert_eq!(
            ChainConfig::default().with_initial_balance(-10).validate(),
            Err(ConfigError::NegativeInitialBalance(-10))
        );
        assert_eq!(
            ChainConfig::default().with_bootstrap_amount(-200).validate(),
            Err(ConfigError::NegativeBootstrapAmount(-200))
        );
        assert_eq!(
            ChainConfig::default().with_accounts(["Alice", NETWORK]).validate(),
            Err(ConfigError::ReservedAccount(NETWORK.to_string()))
        );
    }

    #[test]
    fn test_builders() {
        let config = ChainConfig::default()
            .with_accounts(["Alice"])
            .with_initial_balance(10)
            .with_bootstrap_amount(0)
            .with_reward(5)
            .with_difficulty(0);

        assert_eq!(config.accounts, vec!["Alice"]);
        assert_eq!(config.initial_balance, 10);
        assert_eq!(config.bootstrap_amount, 0);
        assert_eq!(config.reward, 5);
        assert_eq!(config.difficulty, 0);
    }
}
