//! Claim window scanner
//!
//! Looks back over the last `window` rounds before the current one and
//! collects those the account can still claim. Reads for every candidate run
//! concurrently; a candidate whose reads fail is left out of the batch.

use ethers::types::Address;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{ClaimBatch, Round};
use crate::infrastructure::client::PlatformAdapter;

pub const DEFAULT_CLAIM_WINDOW: u64 = 5;

pub struct ClaimWindowScanner {
    platform: Arc<dyn PlatformAdapter>,
    window: u64,
}

impl ClaimWindowScanner {
    pub fn new(platform: Arc<dyn PlatformAdapter>, window: u64) -> Self {
        Self { platform, window }
    }

    /// Rounds `current - window ..= current - 1` (never below 0)
    pub fn candidates(&self, current: Round) -> Vec<Round> {
        (1..=self.window)
            .filter_map(|offset| current.checked_sub(offset))
            .collect()
    }

    pub async fn scan(&self, current: Round, account: Address) -> ClaimBatch {
        let checks = self
            .candidates(current)
            .into_iter()
            .map(|candidate| self.check(candidate, account));

        let batch: ClaimBatch = join_all(checks).await.into_iter().flatten().collect();
        debug!(round = current, claimable = batch.len(), "Claim window scanned");
        batch
    }

    async fn check(&self, candidate: Round, account: Address) -> Option<Round> {
        let (eligibility, ledger) = tokio::join!(
            self.platform.claim_eligibility(candidate, account),
            self.platform.ledger_entry(candidate, account),
        );

        match (eligibility, ledger) {
            (Ok(eligibility), Ok(ledger)) => {
                if !ledger.is_claimable_with(eligibility) {
                    return None;
                }
                debug!(
                    round = candidate,
                    position = ?ledger.position,
                    refund = eligibility.refundable,
                    "Unclaimed round found"
                );
                Some(candidate)
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(round = candidate, "Skipping claim check: {}", e);
                None
            }
        }
    }
}
