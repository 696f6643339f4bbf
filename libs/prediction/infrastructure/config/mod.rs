//! Bot configuration
//!
//! Secrets and the per-run wager come from the environment (`.env` is loaded
//! through dotenv). Tuning knobs come from an optional YAML file; every field
//! there has a default except the dues recipient, which must be set either in
//! the file or through `DUES_RECIPIENT`.

use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::{DEFAULT_MIN_DUES_WEI, DEFAULT_RATIO_THRESHOLD};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const ENV_BET_AMOUNT: &str = "BET_AMOUNT";
pub const ENV_RPC_URL: &str = "RPC_URL";
/// Accepted in place of `RPC_URL`
pub const ENV_RPC_URL_ALIAS: &str = "BSC_RPC";
pub const ENV_WAITING_TIME: &str = "WAITING_TIME";
/// Overrides `dues_recipient` from the tuning file
pub const ENV_DUES_RECIPIENT: &str = "DUES_RECIPIENT";

const DEFAULT_WAITING_TIME_MS: u64 = 270_000;
const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Tuning configuration (YAML, all fields optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pool ratio separating mild from steep imbalance
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: u64,

    /// Number of past rounds scanned for unclaimed winnings
    #[serde(default = "default_claim_window")]
    pub claim_window: u64,

    /// Floor of the adaptive waiting time
    #[serde(default = "default_min_waiting_time")]
    pub min_waiting_time_ms: u64,

    /// Reduction applied to the waiting time after a failed bet
    #[serde(default = "default_waiting_time_step")]
    pub waiting_time_step_ms: u64,

    /// Minimum dues per payout, in wei
    #[serde(default = "default_min_dues")]
    pub min_dues_wei: u128,

    /// Receives the dues on every claimed payout, no default
    #[serde(default)]
    pub dues_recipient: Option<String>,

    /// Status log interval
    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: u64,

    /// Provider polling interval for event filters
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ratio_threshold() -> u64 {
    DEFAULT_RATIO_THRESHOLD
}

fn default_claim_window() -> u64 {
    5
}

fn default_min_waiting_time() -> u64 {
    9_000
}

fn default_waiting_time_step() -> u64 {
    6_000
}

fn default_min_dues() -> u128 {
    DEFAULT_MIN_DUES_WEI
}

fn default_heartbeat() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    3_000
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ratio_threshold: default_ratio_threshold(),
            claim_window: default_claim_window(),
            min_waiting_time_ms: default_min_waiting_time(),
            waiting_time_step_ms: default_waiting_time_step(),
            min_dues_wei: default_min_dues(),
            dues_recipient: None,
            heartbeat_secs: default_heartbeat(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl TuningConfig {
    /// Load tuning from YAML; a missing file yields the defaults
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let yaml_content = std::fs::read_to_string(path)?;
        let config: TuningConfig = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ratio_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "ratio_threshold must be greater than 0".to_string(),
            ));
        }
        if self.claim_window == 0 {
            return Err(ConfigError::ValidationError(
                "claim_window must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                VALID_LOG_LEVELS.join(", ")
            )));
        }
        self.dues_recipient_address()?;
        Ok(())
    }

    pub fn dues_recipient_address(&self) -> Result<Address> {
        let raw = self
            .dues_recipient
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "dues_recipient must be set (tuning file or {})",
                    ENV_DUES_RECIPIENT
                ))
            })?;

        let address: Address = raw.parse().map_err(|_| {
            ConfigError::ValidationError(format!("dues_recipient is not an address: {}", raw))
        })?;
        if address.is_zero() {
            return Err(ConfigError::ValidationError(
                "dues_recipient must not be the zero address".to_string(),
            ));
        }
        Ok(address)
    }

    pub fn min_dues(&self) -> U256 {
        U256::from(self.min_dues_wei)
    }

    pub fn min_waiting_time(&self) -> Duration {
        Duration::from_millis(self.min_waiting_time_ms)
    }

    pub fn waiting_time_step(&self) -> Duration {
        Duration::from_millis(self.waiting_time_step_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Validated bot settings
#[derive(Clone)]
pub struct BotConfig {
    /// Signing key, hex without the 0x prefix
    pub private_key: String,
    /// Stake as written in the environment (native token units)
    pub bet_amount: String,
    /// Stake in wei
    pub bet_amount_wei: U256,
    pub rpc_url: String,
    pub initial_waiting_time_ms: u64,
    pub tuning: TuningConfig,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("private_key", &"<redacted>")
            .field("bet_amount", &self.bet_amount)
            .field("rpc_url", &self.rpc_url)
            .field("initial_waiting_time_ms", &self.initial_waiting_time_ms)
            .field("tuning", &self.tuning)
            .finish()
    }
}

impl BotConfig {
    /// Load `.env`, the tuning file and the environment
    pub fn load(tuning_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let tuning = TuningConfig::load(tuning_path)?;
        Self::from_lookup(|key| std::env::var(key).ok(), tuning)
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F, mut tuning: TuningConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::EnvVarMissing(key.to_string()))
        };

        let private_key = required(ENV_PRIVATE_KEY)?;
        let bet_amount = required(ENV_BET_AMOUNT)?;
        let rpc_url = required(ENV_RPC_URL).or_else(|_| {
            required(ENV_RPC_URL_ALIAS).map_err(|_| ConfigError::EnvVarMissing(ENV_RPC_URL.to_string()))
        })?;

        let initial_waiting_time_ms = match lookup(ENV_WAITING_TIME) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::ValidationError(format!("{} must be milliseconds, got '{}'", ENV_WAITING_TIME, raw))
            })?,
            _ => DEFAULT_WAITING_TIME_MS,
        };

        if let Some(recipient) = lookup(ENV_DUES_RECIPIENT).filter(|v| !v.trim().is_empty()) {
            tuning.dues_recipient = Some(recipient);
        }

        let private_key = private_key.trim_start_matches("0x").to_string();
        let bet_amount_wei = parse_bet_amount(&bet_amount)?;

        let config = Self {
            private_key,
            bet_amount,
            bet_amount_wei,
            rpc_url,
            initial_waiting_time_ms,
            tuning,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.private_key.len() != 64 || !self.private_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::ValidationError(
                "PRIVATE_KEY must be 64 hex characters".to_string(),
            ));
        }

        let valid_scheme = ["http://", "https://"]
            .iter()
            .any(|scheme| self.rpc_url.starts_with(scheme));
        if !valid_scheme {
            return Err(ConfigError::ValidationError(format!(
                "RPC_URL must be an http(s) URL, got '{}'",
                self.rpc_url
            )));
        }

        if self.initial_waiting_time_ms < self.tuning.min_waiting_time_ms {
            return Err(ConfigError::ValidationError(format!(
                "{} ({}ms) is below the floor of {}ms",
                ENV_WAITING_TIME, self.initial_waiting_time_ms, self.tuning.min_waiting_time_ms
            )));
        }

        self.tuning.validate()
    }

    pub fn initial_waiting_time(&self) -> Duration {
        Duration::from_millis(self.initial_waiting_time_ms)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Bet amount: {}", self.bet_amount);
        info!("  RPC url: {}", self.rpc_url);
        info!("  Waiting time: {}ms (floor {}ms)", self.initial_waiting_time_ms, self.tuning.min_waiting_time_ms);
        info!("  Ratio threshold: {}", self.tuning.ratio_threshold);
        info!("  Claim window: {} rounds", self.tuning.claim_window);
        info!("  Dues recipient: {}", self.tuning.dues_recipient.as_deref().unwrap_or("-"));
        info!("  Log level: {}", self.tuning.log_level);
    }
}

fn parse_bet_amount(raw: &str) -> Result<U256> {
    let wei = parse_ether(raw).map_err(|e| {
        ConfigError::ValidationError(format!("{} '{}' is not a decimal amount: {}", ENV_BET_AMOUNT, raw, e))
    })?;
    if wei.is_zero() {
        return Err(ConfigError::ValidationError(format!(
            "{} must be greater than 0",
            ENV_BET_AMOUNT
        )));
    }
    Ok(wei)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
    const RECIPIENT: &str = "0x00000000000000000000000000000000000000dd";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_PRIVATE_KEY, KEY),
            (ENV_BET_AMOUNT, "0.1"),
            (ENV_RPC_URL, "https://bsc-dataseed.binance.org"),
            (ENV_DUES_RECIPIENT, RECIPIENT),
        ]
    }

    #[test]
    fn test_loads_valid_environment() {
        let config = BotConfig::from_lookup(env(&valid_env()), TuningConfig::default()).unwrap();
        assert_eq!(config.private_key.len(), 64);
        assert_eq!(config.bet_amount_wei, U256::exp10(17));
        assert_eq!(config.initial_waiting_time_ms, DEFAULT_WAITING_TIME_MS);
    }

    #[test]
    fn test_rpc_alias_and_waiting_time() {
        let config = BotConfig::from_lookup(
            env(&[
                (ENV_PRIVATE_KEY, KEY),
                (ENV_BET_AMOUNT, "1"),
                (ENV_RPC_URL_ALIAS, "https://bsc-dataseed1.defibit.io"),
                (ENV_WAITING_TIME, "264000"),
                (ENV_DUES_RECIPIENT, RECIPIENT),
            ]),
            TuningConfig::default(),
        )
        .unwrap();
        assert_eq!(config.rpc_url, "https://bsc-dataseed1.defibit.io");
        assert_eq!(config.initial_waiting_time(), Duration::from_millis(264_000));
    }

    #[test]
    fn test_missing_variables() {
        let err = BotConfig::from_lookup(env(&[]), TuningConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarMissing(ref k) if k == ENV_PRIVATE_KEY));

        let err = BotConfig::from_lookup(
            env(&[(ENV_PRIVATE_KEY, KEY), (ENV_BET_AMOUNT, "0.1")]),
            TuningConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarMissing(ref k) if k == ENV_RPC_URL));
    }

    #[test]
    fn test_rejects_malformed_values() {
        let cases: Vec<(&str, &str)> = vec![
            (ENV_PRIVATE_KEY, "0x1234"),
            (ENV_BET_AMOUNT, "lots"),
            (ENV_BET_AMOUNT, "0"),
            (ENV_RPC_URL, "bsc-dataseed.binance.org"),
            (ENV_RPC_URL, "wss://bsc-ws-node.nariox.org"),
            (ENV_WAITING_TIME, "soon"),
            (ENV_WAITING_TIME, "1000"),
        ];
        for (key, value) in cases {
            let mut pairs = valid_env();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            let result = BotConfig::from_lookup(env(&pairs), TuningConfig::default());
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = BotConfig::from_lookup(env(&valid_env()), TuningConfig::default()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&config.private_key));
    }

    #[test]
    fn test_tuning_yaml_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ratio_threshold: 7\nclaim_window: 3\nlog_level: debug").unwrap();

        let tuning = TuningConfig::load(file.path()).unwrap();
        assert_eq!(tuning.ratio_threshold, 7);
        assert_eq!(tuning.claim_window, 3);
        assert_eq!(tuning.log_level, "debug");
        assert_eq!(tuning.waiting_time_step_ms, 6_000);
        assert_eq!(tuning.min_dues(), U256::from(DEFAULT_MIN_DUES_WEI));
    }

    #[test]
    fn test_missing_tuning_file_uses_defaults() {
        let tuning = TuningConfig::load("does/not/exist.yaml").unwrap();
        assert_eq!(tuning.claim_window, 5);
        assert!(tuning.dues_recipient.is_none());
        assert!(tuning.dues_recipient_address().is_err());
    }

    #[test]
    fn test_dues_recipient_required() {
        let mut pairs = valid_env();
        pairs.retain(|(k, _)| *k != ENV_DUES_RECIPIENT);

        let err = BotConfig::from_lookup(env(&pairs), TuningConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("dues_recipient")));

        for bad in ["", "  ", "nobody", "0x0000000000000000000000000000000000000000"] {
            let tuning = TuningConfig {
                dues_recipient: Some(bad.to_string()),
                ..TuningConfig::default()
            };
            assert!(
                BotConfig::from_lookup(env(&pairs), tuning).is_err(),
                "dues_recipient '{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_dues_recipient_from_file_or_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dues_recipient: \"{}\"", RECIPIENT).unwrap();
        let tuning = TuningConfig::load(file.path()).unwrap();

        let mut pairs = valid_env();
        pairs.retain(|(k, _)| *k != ENV_DUES_RECIPIENT);
        let config = BotConfig::from_lookup(env(&pairs), tuning.clone()).unwrap();
        assert_eq!(
            config.tuning.dues_recipient_address().unwrap(),
            Address::from_low_u64_be(0xdd)
        );

        pairs.push((ENV_DUES_RECIPIENT, "0x00000000000000000000000000000000000000ee"));
        let config = BotConfig::from_lookup(env(&pairs), tuning).unwrap();
        assert_eq!(
            config.tuning.dues_recipient_address().unwrap(),
            Address::from_low_u64_be(0xee)
        );
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = TuningConfig {
            claim_window: 0,
            ..TuningConfig::default()
        };
        let err = BotConfig::from_lookup(env(&valid_env()), tuning).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let tuning = TuningConfig {
            log_level: "loud".to_string(),
            ..TuningConfig::default()
        };
        assert!(BotConfig::from_lookup(env(&valid_env()), tuning).is_err());
    }
}
