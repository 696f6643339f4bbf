//! Prediction Round Bot
//!
//! Bets on PancakeSwap Prediction and Candle Genie rounds from pool
//! imbalance, then claims past winnings and forwards the service dues.
//!
//! ## Layers
//!
//! - **domain**: rounds, pools, betting strategy, dues
//! - **infrastructure**: chain client, contract adapters, config, logging
//! - **application**: waiting time, claim scanner, round lifecycle, facade
//! - **utils**: shutdown and heartbeat helpers

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod utils;

// Re-export commonly used items
pub use application::{PredictionBot, RoundController, RoundReport, RoundState};
pub use domain::{PoolAmounts, Round, Side, StrategyMode};
pub use infrastructure::{BotConfig, PlatformAdapter, PlatformKind};
pub use utils::{Heartbeat, ShutdownManager};
