//! Round lifecycle controller
//!
//! Drives one lifecycle per started round:
//!
//! ```text
//! SIGNALED → WAITING → AMOUNTS_READ → DECIDED → BET_PENDING → BET_CONFIRMED | BET_FAILED
//!          → CLAIM_SCANNED → CLAIM_NONE | CLAIM_PENDING → CLAIM_CONFIRMED | CLAIM_FAILED
//!          → DUES_DISPATCHED → DONE
//! ```
//!
//! Claim processing runs after every bet attempt, whether the bet landed,
//! failed, or was skipped because the pools could not be read. Lifecycles of
//! different rounds run as independent tasks; the only state they share is
//! the waiting time and the in-flight set.

use ethers::types::U256;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::state::{DuesOutcome, RoundReport, RoundState};
use crate::application::scanner::ClaimWindowScanner;
use crate::application::waiting_time::WaitingTime;
use crate::domain::{
    BetDecision, DuesCalculator, PoolAmounts, Round, StrategyEvaluator, StrategyMode,
};
use crate::infrastructure::client::{
    from_wei, AdapterError, Payout, PlatformAdapter, Receipt, Wallet,
};
use crate::infrastructure::config::{BotConfig, ConfigError};
use crate::infrastructure::logging::Console;

/// Everything the controller needs besides its collaborators
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub mode: StrategyMode,
    pub ratio_threshold: u64,
    pub stake: U256,
    pub claim_window: u64,
    pub dues: DuesCalculator,
    pub initial_waiting_time: Duration,
    pub min_waiting_time: Duration,
    pub waiting_time_step: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &BotConfig, mode: StrategyMode) -> Result<Self, ConfigError> {
        let tuning = &config.tuning;
        Ok(Self {
            mode,
            ratio_threshold: tuning.ratio_threshold,
            stake: config.bet_amount_wei,
            claim_window: tuning.claim_window,
            dues: DuesCalculator::new(tuning.min_dues(), tuning.dues_recipient_address()?),
            initial_waiting_time: config.initial_waiting_time(),
            min_waiting_time: tuning.min_waiting_time(),
            waiting_time_step: tuning.waiting_time_step(),
        })
    }
}

pub struct RoundController {
    platform: Arc<dyn PlatformAdapter>,
    wallet: Arc<dyn Wallet>,
    evaluator: StrategyEvaluator,
    scanner: ClaimWindowScanner,
    dues: DuesCalculator,
    stake: U256,
    waiting_time: WaitingTime,
    in_flight: Mutex<HashSet<Round>>,
    completed: AtomicU64,
    console: Console,
}

impl RoundController {
    pub fn new(
        platform: Arc<dyn PlatformAdapter>,
        wallet: Arc<dyn Wallet>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            scanner: ClaimWindowScanner::new(Arc::clone(&platform), settings.claim_window),
            platform,
            wallet,
            evaluator: StrategyEvaluator::new(settings.mode, settings.ratio_threshold),
            dues: settings.dues,
            stake: settings.stake,
            waiting_time: WaitingTime::new(
                settings.initial_waiting_time,
                settings.min_waiting_time,
                settings.waiting_time_step,
            ),
            in_flight: Mutex::new(HashSet::new()),
            completed: AtomicU64::new(0),
            console: Console,
        }
    }

    pub fn mode(&self) -> StrategyMode {
        self.evaluator.mode()
    }

    pub fn stake(&self) -> U256 {
        self.stake
    }

    pub fn waiting_time(&self) -> Duration {
        self.waiting_time.current()
    }

    /// Rounds whose lifecycle has not finished yet, ascending
    pub fn in_flight(&self) -> Vec<Round> {
        let mut rounds: Vec<Round> = self.in_flight.lock().iter().copied().collect();
        rounds.sort_unstable();
        rounds
    }

    pub fn rounds_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Start an independent lifecycle for `round`
    ///
    /// Returns `None` when that round is already in flight. The task yields
    /// `None` when the lifecycle panicked; the panic is logged and swallowed.
    pub fn spawn_round(self: &Arc<Self>, round: Round) -> Option<JoinHandle<Option<RoundReport>>> {
        if !self.in_flight.lock().insert(round) {
            warn!(round, "Round already in flight, ignoring repeated signal");
            return None;
        }

        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            let outcome = AssertUnwindSafe(controller.run_round(round))
                .catch_unwind()
                .await;

            controller.in_flight.lock().remove(&round);
            controller.completed.fetch_add(1, Ordering::Relaxed);

            match outcome {
                Ok(report) => Some(report),
                Err(panic) => {
                    error!(round, "Round lifecycle aborted: {}", panic_message(&*panic));
                    None
                }
            }
        }))
    }

    /// Run one full lifecycle in the current task
    pub async fn run_round(&self, round: Round) -> RoundReport {
        let mut report = RoundReport::new(round);
        self.console.info(format!("Round {} started", round));

        let wait = self.waiting_time.current();
        report.waited = wait;
        report.enter(RoundState::Waiting);
        tokio::time::sleep(wait).await;

        match self.platform.round_amounts(round).await {
            Ok(pools) => {
                report.enter(RoundState::AmountsRead);
                self.place_bet(round, pools, &mut report).await;
            }
            Err(e) => {
                report.enter(RoundState::AmountsUnavailable);
                self.console
                    .error(format!("Round {}: could not read pool amounts, skipping bet: {}", round, e));
            }
        }

        self.process_claims(round, &mut report).await;

        report.enter(RoundState::Done);
        report
    }

    async fn place_bet(&self, round: Round, pools: PoolAmounts, report: &mut RoundReport) {
        let decision = BetDecision {
            side: self.evaluator.decide(&pools),
            stake: self.stake,
        };
        report.decision = Some(decision);
        report.enter(RoundState::Decided);

        self.console.info(format!(
            "Round {}: bull {} / bear {}, betting {} on {} ({})",
            round,
            from_wei(pools.bull),
            from_wei(pools.bear),
            from_wei(decision.stake),
            decision.side,
            self.evaluator.mode(),
        ));

        report.enter(RoundState::BetPending);
        match self.submit_bet(round, decision).await {
            Ok(receipt) => {
                report.bet_tx = Some(receipt.tx_hash);
                report.enter(RoundState::BetConfirmed);
                self.console
                    .success(format!("Round {}: {} bet confirmed ({:?})", round, decision.side, receipt.tx_hash));
            }
            Err(e) => {
                report.enter(RoundState::BetFailed);
                let reduced = self.waiting_time.reduce();
                self.console.error(format!("Round {}: bet failed: {}", round, e));
                if self.waiting_time.is_at_floor() {
                    self.console
                        .warn(format!("Waiting time at its floor of {}ms", reduced.as_millis()));
                } else {
                    self.console
                        .warn(format!("Waiting time reduced to {}ms", reduced.as_millis()));
                }
            }
        }
    }

    async fn submit_bet(&self, round: Round, decision: BetDecision) -> Result<Receipt, AdapterError> {
        let pending = self
            .platform
            .submit_bet(round, decision.side, decision.stake)
            .await?;
        debug!(round, tx = ?pending.tx_hash(), "Bet broadcast");
        pending.confirmation().await
    }

    async fn process_claims(&self, round: Round, report: &mut RoundReport) {
        let batch = self.scanner.scan(round, self.wallet.address()).await;
        report.enter(RoundState::ClaimScanned);

        if batch.is_empty() {
            report.enter(RoundState::ClaimNone);
            return;
        }

        let rounds = batch.rounds();
        report.enter(RoundState::ClaimPending);
        self.console
            .info(format!("Round {}: claiming rounds {:?}", round, rounds));

        let receipt = match self.submit_claim(&rounds).await {
            Ok(receipt) => receipt,
            Err(e) => {
                report.enter(RoundState::ClaimFailed);
                self.console
                    .error(format!("Round {}: claim of {:?} failed: {}", round, rounds, e));
                return;
            }
        };

        report.claimed = rounds;
        report.enter(RoundState::ClaimConfirmed);
        self.console.success(format!(
            "Round {}: claimed {} round(s), {} payout(s) ({:?})",
            round,
            report.claimed.len(),
            receipt.payouts.len(),
            receipt.tx_hash
        ));

        // Sequential so transfers from one account never race for a nonce
        for payout in &receipt.payouts {
            let outcome = self.dispatch_dues(*payout).await;
            report.dues.push(outcome);
        }
        report.enter(RoundState::DuesDispatched);
    }

    async fn submit_claim(&self, rounds: &[Round]) -> Result<Receipt, AdapterError> {
        let pending = self.platform.submit_claim(rounds).await?;
        debug!(?rounds, tx = ?pending.tx_hash(), "Claim broadcast");
        pending.confirmation().await
    }

    async fn dispatch_dues(&self, payout: Payout) -> DuesOutcome {
        let fee = self.dues.compute_fee(Some(payout.amount));
        let result = match self.wallet.transfer(self.dues.recipient(), fee).await {
            Ok(pending) => {
                debug!(round = payout.round, tx = ?pending.tx_hash(), "Dues broadcast");
                pending.confirmation().await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(receipt) => DuesOutcome {
                payout,
                fee,
                tx_hash: Some(receipt.tx_hash),
                error: None,
            },
            Err(e) => {
                self.console.error(format!(
                    "Dues of {} for round {} not sent: {}",
                    from_wei(fee),
                    payout.round,
                    e
                ));
                DuesOutcome {
                    payout,
                    fee,
                    tx_hash: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
