//! Infrastructure Layer
//!
//! Contains implementations of external interfaces (chain client, contract
//! adapters, configuration, logging).
//! This layer depends on the domain layer but not on the application layer.

pub mod client;
pub mod config;
pub mod logging;

// Re-export commonly used types from client
pub use client::{
    AdapterError, CandleGenieAdapter, ChainClient, PancakeAdapter, Payout, PendingTransaction,
    PendingTx, PlatformAdapter, PlatformKind, Receipt, Wallet,
};

// Re-export config types
pub use config::{BotConfig, ConfigError, TuningConfig};

// Re-export logging
pub use logging::{init_tracing_with_level, Console};
