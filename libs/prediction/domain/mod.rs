//! Domain Layer
//!
//! Contains pure business entities and decision rules.
//! This layer has no dependencies on infrastructure or application layers.

pub mod dues;
pub mod round;
pub mod strategy;

// Re-export domain entities
pub use round::{
    BetDecision, ClaimBatch, ClaimEligibility, LedgerEntry, PoolAmounts, Round, Side,
};

// Re-export decision rules
pub use dues::{DuesCalculator, DEFAULT_MIN_DUES_WEI, DUES_DIVISOR};
pub use strategy::{
    decide, decide_with_threshold, StrategyEvaluator, StrategyMode, DEFAULT_RATIO_THRESHOLD,
};
