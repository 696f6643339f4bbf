//! Betting strategy
//!
//! Maps the two pool totals of a round to the side to bet on.
//!
//! The ratio test uses integer division in wei. A ratio at or above the
//! threshold is a steep imbalance. A zero denominator makes the ratio
//! infinite, so it is always steep:
//!
//! | pools (bull, bear) | Contrarian | Majority |
//! |--------------------|------------|----------|
//! | (x > 0, 0)         | Bull       | Bear     |
//! | (0, x > 0)         | Bear       | Bull     |
//! | (0, 0)             | Bull       | Bear     |

use super::round::{PoolAmounts, Side};
use ethers::types::U256;
use std::fmt;
use std::str::FromStr;

/// Default pool ratio separating a mild imbalance from a heavy one
pub const DEFAULT_RATIO_THRESHOLD: u64 = 5;

/// How to read the pool imbalance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyMode {
    /// Bet against the crowd while the imbalance is mild
    #[default]
    Contrarian,
    /// Mirror image of Contrarian
    Majority,
}

impl StrategyMode {
    pub fn from_flag(with_majority: bool) -> Self {
        if with_majority {
            StrategyMode::Majority
        } else {
            StrategyMode::Contrarian
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyMode::Contrarian => "contrarian",
            StrategyMode::Majority => "majority",
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contrarian" | "against" => Ok(StrategyMode::Contrarian),
            "majority" | "with" => Ok(StrategyMode::Majority),
            other => Err(format!("unknown strategy mode: {}", other)),
        }
    }
}

/// Pool-imbalance evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyEvaluator {
    mode: StrategyMode,
    ratio_threshold: U256,
}

impl StrategyEvaluator {
    pub fn new(mode: StrategyMode, ratio_threshold: u64) -> Self {
        Self {
            mode,
            ratio_threshold: U256::from(ratio_threshold),
        }
    }

    pub fn mode(&self) -> StrategyMode {
        self.mode
    }

    pub fn decide(&self, pools: &PoolAmounts) -> Side {
        decide_with_threshold(self.mode, pools.bull, pools.bear, self.ratio_threshold)
    }
}

impl Default for StrategyEvaluator {
    fn default() -> Self {
        Self::new(StrategyMode::default(), DEFAULT_RATIO_THRESHOLD)
    }
}

/// Decide with the default ratio threshold
pub fn decide(mode: StrategyMode, bull_total: U256, bear_total: U256) -> Side {
    decide_with_threshold(
        mode,
        bull_total,
        bear_total,
        U256::from(DEFAULT_RATIO_THRESHOLD),
    )
}

pub fn decide_with_threshold(
    mode: StrategyMode,
    bull_total: U256,
    bear_total: U256,
    threshold: U256,
) -> Side {
    let contrarian = contrarian_side(bull_total, bear_total, threshold);
    match mode {
        StrategyMode::Contrarian => contrarian,
        StrategyMode::Majority => contrarian.opposite(),
    }
}

fn contrarian_side(bull: U256, bear: U256, threshold: U256) -> Side {
    let bull_heavy_mild = bull > bear && ratio_below(bull, bear, threshold);
    let bear_heavy_steep = bull < bear && ratio_at_least(bear, bull, threshold);

    if bull_heavy_mild || bear_heavy_steep {
        Side::Bear
    } else {
        Side::Bull
    }
}

/// `numerator / denominator < threshold`, infinite when the denominator is zero
fn ratio_below(numerator: U256, denominator: U256, threshold: U256) -> bool {
    match numerator.checked_div(denominator) {
        Some(ratio) => ratio < threshold,
        None => false,
    }
}

/// `numerator / denominator >= threshold`, infinite when the denominator is zero
fn ratio_at_least(numerator: U256, denominator: U256, threshold: U256) -> bool {
    match numerator.checked_div(denominator) {
        Some(ratio) => ratio >= threshold,
        None => true,
    }
}
