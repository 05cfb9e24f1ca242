//! Configuration for the ledger

use crate::types::Tokens;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Transfer policy
    pub policy: PolicyConfig,

    /// Feed configuration
    pub feed: FeedConfig,

    /// Community pulse configuration
    pub pulse: PulseConfig,

    /// Seed data configuration
    pub seed: SeedConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "kindness-core".to_string(),
            policy: PolicyConfig::default(),
            feed: FeedConfig::default(),
            pulse: PulseConfig::default(),
            seed: SeedConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Balance and transfer rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Balance issued on first registration
    pub starting_balance: Tokens,

    /// Smallest transfer amount
    pub min_amount: Tokens,

    /// Largest transfer amount
    pub max_amount: Tokens,

    /// Minimum note length after trimming
    pub min_note_len: usize,

    /// Maximum note length after trimming (characters)
    pub max_note_len: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 5,
            min_amount: 1,
            max_amount: 5,
            min_note_len: 3,
            max_note_len: 280,
        }
    }
}

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Entries returned when the caller gives no limit
    pub default_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

/// Community pulse configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Window counted as "recent" (seconds)
    pub window_secs: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self { window_secs: 300 } // 5 minutes
    }
}

/// Seed data configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Load the demo participants and transfers at startup
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("KINDNESS_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(value) = std::env::var("KINDNESS_STARTING_BALANCE") {
            config.policy.starting_balance = parse_env("KINDNESS_STARTING_BALANCE", &value)?;
        }

        if let Ok(value) = std::env::var("KINDNESS_SEED_DEMO") {
            config.seed.enabled = parse_env("KINDNESS_SEED_DEMO", &value)?;
        }

        if let Ok(level) = std::env::var("KINDNESS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(value) = std::env::var("KINDNESS_LOG_JSON") {
            config.logging.json = parse_env("KINDNESS_LOG_JSON", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the policy is internally consistent
    pub fn validate(&self) -> crate::Result<()> {
        let policy = &self.policy;

        if policy.starting_balance < 0 {
            return Err(crate::Error::Config(
                "starting_balance must not be negative".to_string(),
            ));
        }

        if policy.min_amount < 1 {
            return Err(crate::Error::Config("min_amount must be at least 1".to_string()));
        }

        if policy.max_amount < policy.min_amount {
            return Err(crate::Error::Config(format!(
                "max_amount {} is below min_amount {}",
                policy.max_amount, policy.min_amount
            )));
        }

        if policy.min_note_len == 0 {
            return Err(crate::Error::Config(
                "min_note_len must be at least 1".to_string(),
            ));
        }

        if policy.max_note_len < policy.min_note_len {
            return Err(crate::Error::Config(format!(
                "max_note_len {} is below min_note_len {}",
                policy.max_note_len, policy.min_note_len
            )));
        }

        if self.feed.default_limit == 0 {
            return Err(crate::Error::Config(
                "feed.default_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T>(name: &str, value: &str) -> crate::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| crate::Error::Config(format!("Invalid {}={:?}: {}", name, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "kindness-core");
        assert_eq!(config.policy.starting_balance, 5);
        assert_eq!((config.policy.min_amount, config.policy.max_amount), (1, 5));
        assert_eq!(config.policy.min_note_len, 3);
        assert_eq!(config.policy.max_note_len, 280);
        assert!(!config.seed.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[policy]\nstarting_balance = 10\n\n[seed]\nenabled = true\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.policy.starting_balance, 10);
        assert_eq!(config.policy.max_amount, 5);
        assert!(config.seed.enabled);
        assert_eq!(config.feed.default_limit, 20);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "policy = [").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut config = Config::default();
        config.policy.max_amount = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.max_note_len = 2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.min_note_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env() {
        assert_eq!(parse_env::<i64>("X", "7").unwrap(), 7);
        assert!(parse_env::<bool>("X", "maybe").is_err());
    }
}
