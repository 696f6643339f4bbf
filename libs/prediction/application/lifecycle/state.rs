//! Round lifecycle states and the per-round report

use ethers::types::{TxHash, U256};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::domain::{BetDecision, Round};
use crate::infrastructure::client::Payout;

/// Lifecycle states, strictly sequential within one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundState {
    Signaled,
    Waiting,
    AmountsRead,
    /// Pool read failed; betting is skipped for this round
    AmountsUnavailable,
    Decided,
    BetPending,
    BetConfirmed,
    BetFailed,
    ClaimScanned,
    ClaimNone,
    ClaimPending,
    ClaimConfirmed,
    ClaimFailed,
    DuesDispatched,
    Done,
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::Signaled => "SIGNALED",
            RoundState::Waiting => "WAITING",
            RoundState::AmountsRead => "AMOUNTS_READ",
            RoundState::AmountsUnavailable => "AMOUNTS_UNAVAILABLE",
            RoundState::Decided => "DECIDED",
            RoundState::BetPending => "BET_PENDING",
            RoundState::BetConfirmed => "BET_CONFIRMED",
            RoundState::BetFailed => "BET_FAILED",
            RoundState::ClaimScanned => "CLAIM_SCANNED",
            RoundState::ClaimNone => "CLAIM_NONE",
            RoundState::ClaimPending => "CLAIM_PENDING",
            RoundState::ClaimConfirmed => "CLAIM_CONFIRMED",
            RoundState::ClaimFailed => "CLAIM_FAILED",
            RoundState::DuesDispatched => "DUES_DISPATCHED",
            RoundState::Done => "DONE",
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one dues transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuesOutcome {
    pub payout: Payout,
    pub fee: U256,
    pub tx_hash: Option<TxHash>,
    pub error: Option<String>,
}

impl DuesOutcome {
    pub fn is_sent(&self) -> bool {
        self.error.is_none()
    }
}

/// What happened to one round
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: Round,
    pub trail: Vec<RoundState>,
    pub waited: Duration,
    pub decision: Option<BetDecision>,
    pub bet_tx: Option<TxHash>,
    pub claimed: Vec<Round>,
    pub dues: Vec<DuesOutcome>,
}

impl RoundReport {
    pub fn new(round: Round) -> Self {
        Self {
            round,
            trail: vec![RoundState::Signaled],
            waited: Duration::ZERO,
            decision: None,
            bet_tx: None,
            claimed: Vec::new(),
            dues: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, state: RoundState) {
        debug!(round = self.round, state = %state, "Round state");
        self.trail.push(state);
    }

    pub fn state(&self) -> RoundState {
        self.trail.last().copied().unwrap_or(RoundState::Signaled)
    }

    pub fn visited(&self, state: RoundState) -> bool {
        self.trail.contains(&state)
    }

    pub fn is_done(&self) -> bool {
        self.state() == RoundState::Done
    }
}
