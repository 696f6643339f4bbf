//! CLI utilities for binaries
//!
//! Handles command line flags and the tuning config path shared by both
//! platform binaries.

use clap::Parser;
use prediction::StrategyMode;
use std::path::PathBuf;

/// Environment variable holding the tuning config path
pub const CONFIG_PATH_ENV: &str = "BOT_CONFIG_PATH";

/// Default tuning config path
pub const DEFAULT_CONFIG_PATH: &str = "config/bot_config.yaml";

/// Command line flags
#[derive(Debug, Clone, Parser)]
#[command(about = "Automated prediction round betting")]
pub struct BotArgs {
    /// Bet with the crowd instead of against it
    #[arg(long = "with", visible_alias = "majority")]
    pub with_majority: bool,

    /// Tuning config file (overrides BOT_CONFIG_PATH)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl BotArgs {
    pub fn strategy_mode(&self) -> StrategyMode {
        StrategyMode::from_flag(self.with_majority)
    }

    /// Flag first, then environment, then the default path
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(load_config_from_env)
    }
}

/// Load the tuning config path from environment or use the default
pub fn load_config_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Parse command line arguments for a binary
pub fn parse_args() -> BotArgs {
    BotArgs::parse()
}
