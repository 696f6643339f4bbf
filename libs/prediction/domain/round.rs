//! Round domain entities
//!
//! Plain data observed from a prediction contract. None of these types talk
//! to the chain; adapters build them from contract reads.

use ethers::types::U256;
use std::collections::BTreeSet;
use std::fmt;

/// Round identifier assigned by the platform (the contract's "epoch")
pub type Round = u64;

/// Side of a prediction round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bull,
    Bear,
}

impl Side {
    /// The other pool
    pub fn opposite(self) -> Self {
        match self {
            Side::Bull => Side::Bear,
            Side::Bear => Side::Bull,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bull => write!(f, "Bull"),
            Side::Bear => write!(f, "Bear"),
        }
    }
}

/// Pool totals of one round, in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAmounts {
    pub bull: U256,
    pub bear: U256,
}

impl PoolAmounts {
    pub fn new(bull: impl Into<U256>, bear: impl Into<U256>) -> Self {
        Self {
            bull: bull.into(),
            bear: bear.into(),
        }
    }
}

/// Side plus the stake to put on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetDecision {
    pub side: Side,
    pub stake: U256,
}

/// Per (round, account) ledger record kept by the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerEntry {
    /// Position recorded by the contract, if any stake was placed
    pub position: Option<Side>,
    pub amount: U256,
    pub claimed: bool,
}

/// Contract-reported eligibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClaimEligibility {
    pub claimable: bool,
    pub refundable: bool,
}

impl LedgerEntry {
    /// Whether a past round belongs in a claim batch
    pub fn is_claimable_with(&self, eligibility: ClaimEligibility) -> bool {
        !self.amount.is_zero()
            && (eligibility.claimable || eligibility.refundable)
            && !self.claimed
    }
}

/// Set of past rounds to claim in one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimBatch {
    rounds: BTreeSet<Round>,
}

impl ClaimBatch {
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Rounds in ascending order
    pub fn rounds(&self) -> Vec<Round> {
        self.rounds.iter().copied().collect()
    }
}

impl FromIterator<Round> for ClaimBatch {
    fn from_iter<I: IntoIterator<Item = Round>>(iter: I) -> Self {
        Self {
            rounds: iter.into_iter().collect(),
        }
    }
}
