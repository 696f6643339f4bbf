//! Chain client and platform adapters

pub mod candle;
pub mod chain;
pub mod pancake;
pub mod platform;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use candle::{CandleGenieAdapter, CANDLE_GENIE_CONTRACT};
pub use chain::{from_wei, ChainClient, ChainTransaction, PayoutDecoder, SignerClient};
pub use pancake::{PancakeAdapter, PANCAKE_PREDICTION_CONTRACT};
pub use platform::{
    AdapterError, Payout, PendingTransaction, PendingTx, PlatformAdapter, Receipt, Result, Wallet,
};

/// Supported prediction platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Pancake,
    CandleGenie,
}

impl PlatformKind {
    pub fn available() -> Vec<&'static str> {
        vec!["pancake", "candle"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Pancake => "pancake",
            PlatformKind::CandleGenie => "candle",
        }
    }

    /// Bind the adapter for this platform to a connected chain client
    pub fn adapter(&self, chain: ChainClient) -> Result<Arc<dyn PlatformAdapter>> {
        let adapter: Arc<dyn PlatformAdapter> = match self {
            PlatformKind::Pancake => Arc::new(PancakeAdapter::new(chain)?),
            PlatformKind::CandleGenie => Arc::new(CandleGenieAdapter::new(chain)?),
        };
        Ok(adapter)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pancake" | "pcs" | "pancakeswap" => Ok(PlatformKind::Pancake),
            "candle" | "cg" | "candlegenie" => Ok(PlatformKind::CandleGenie),
            other => Err(format!(
                "Unknown platform: '{}'. Available platforms: {}",
                other,
                Self::available().join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("pcs".parse::<PlatformKind>().unwrap(), PlatformKind::Pancake);
        assert_eq!("CandleGenie".parse::<PlatformKind>().unwrap(), PlatformKind::CandleGenie);
        assert!("uniswap".parse::<PlatformKind>().is_err());
        assert_eq!(PlatformKind::Pancake.to_string(), "pancake");
    }
}
