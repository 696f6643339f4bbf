//! Common test utilities for round lifecycle tests
//!
//! A scripted in-memory platform and wallet. Every call is recorded so tests
//! can assert on what the controller did, not only on the final report.

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use prediction::application::{ControllerSettings, RoundController};
use prediction::domain::{ClaimEligibility, DuesCalculator, LedgerEntry, PoolAmounts, Round, Side};
use prediction::infrastructure::client::{
    AdapterError, Payout, PendingTransaction, PendingTx, PlatformAdapter, Receipt, Result, Wallet,
};
use prediction::StrategyMode;

static NEXT_TX: AtomicU64 = AtomicU64::new(1);

fn next_tx_hash() -> TxHash {
    TxHash::from_low_u64_be(NEXT_TX.fetch_add(1, Ordering::Relaxed))
}

/// Pending transaction whose outcome is fixed at submission
pub struct ScriptedTx {
    tx_hash: TxHash,
    reverts: bool,
    payouts: Vec<Payout>,
}

impl ScriptedTx {
    pub fn confirmed(payouts: Vec<Payout>) -> PendingTx {
        Box::new(Self {
            tx_hash: next_tx_hash(),
            reverts: false,
            payouts,
        })
    }

    pub fn reverted() -> PendingTx {
        Box::new(Self {
            tx_hash: next_tx_hash(),
            reverts: true,
            payouts: Vec::new(),
        })
    }
}

#[async_trait]
impl PendingTransaction for ScriptedTx {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirmation(self: Box<Self>) -> Result<Receipt> {
        if self.reverts {
            return Err(AdapterError::Reverted(self.tx_hash));
        }
        Ok(Receipt {
            tx_hash: self.tx_hash,
            payouts: self.payouts,
        })
    }
}

#[derive(Default)]
struct Script {
    amounts: HashMap<Round, PoolAmounts>,
    amounts_fail: bool,
    bet_reverts: bool,
    bet_submit_fails: bool,
    claimable: HashMap<Round, U256>,
    failing_reads: HashSet<Round>,
    claim_fails: bool,
    payouts: Vec<Payout>,
    signals: Vec<Round>,
    signals_fail: bool,
    panic_on_amounts: HashSet<Round>,
}

#[derive(Default)]
struct Calls {
    bets: Vec<(Round, Side, U256)>,
    claims: Vec<Vec<Round>>,
    checked: Vec<Round>,
}

/// In-memory prediction contract
#[derive(Default)]
pub struct MockPlatform {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amounts(self, round: Round, bull: u64, bear: u64) -> Self {
        self.script
            .lock()
            .amounts
            .insert(round, PoolAmounts::new(bull, bear));
        self
    }

    pub fn failing_amounts(self) -> Self {
        self.script.lock().amounts_fail = true;
        self
    }

    pub fn panicking_on(self, round: Round) -> Self {
        self.script.lock().panic_on_amounts.insert(round);
        self
    }

    pub fn reverting_bets(self) -> Self {
        self.script.lock().bet_reverts = true;
        self
    }

    /// Bets rejected before broadcast, no transaction exists
    pub fn failing_bet_submissions(self) -> Self {
        self.script.lock().bet_submit_fails = true;
        self
    }

    /// Past round holding an unclaimed winning stake
    pub fn with_claimable(self, round: Round, stake: u64) -> Self {
        self.script.lock().claimable.insert(round, U256::from(stake));
        self
    }

    pub fn failing_reads(self, round: Round) -> Self {
        self.script.lock().failing_reads.insert(round);
        self
    }

    pub fn failing_claims(self) -> Self {
        self.script.lock().claim_fails = true;
        self
    }

    /// Payout reported by the next successful claim
    pub fn with_payout(self, round: Round, amount: u64) -> Self {
        self.script.lock().payouts.push(Payout {
            round,
            amount: U256::from(amount),
        });
        self
    }

    pub fn with_signals(self, rounds: &[Round]) -> Self {
        self.script.lock().signals.extend_from_slice(rounds);
        self
    }

    /// End the signal stream with an error after the scripted rounds
    pub fn failing_signals(self) -> Self {
        self.script.lock().signals_fail = true;
        self
    }

    pub fn bets(&self) -> Vec<(Round, Side, U256)> {
        self.calls.lock().bets.clone()
    }

    pub fn claims(&self) -> Vec<Vec<Round>> {
        self.calls.lock().claims.clone()
    }

    /// Rounds whose claim eligibility was read, sorted
    pub fn checked(&self) -> Vec<Round> {
        let mut checked = self.calls.lock().checked.clone();
        checked.sort_unstable();
        checked
    }
}

#[async_trait]
impl PlatformAdapter for MockPlatform {
    fn name(&self) -> &str {
        "Mock"
    }

    fn contract_address(&self) -> Address {
        Address::repeat_byte(0xcc)
    }

    async fn round_amounts(&self, round: Round) -> Result<PoolAmounts> {
        let script = self.script.lock();
        if script.panic_on_amounts.contains(&round) {
            panic!("scripted panic in round {}", round);
        }
        if script.amounts_fail {
            return Err(AdapterError::ProviderError("rounds() unavailable".to_string()));
        }
        Ok(script
            .amounts
            .get(&round)
            .copied()
            .unwrap_or_else(|| PoolAmounts::new(100u64, 100u64)))
    }

    async fn submit_bet(&self, round: Round, side: Side, stake: U256) -> Result<PendingTx> {
        self.calls.lock().bets.push((round, side, stake));
        let script = self.script.lock();
        if script.bet_submit_fails {
            return Err(AdapterError::TransactionFailed("insufficient funds for gas".to_string()));
        }
        if script.bet_reverts {
            return Ok(ScriptedTx::reverted());
        }
        Ok(ScriptedTx::confirmed(Vec::new()))
    }

    async fn claim_eligibility(&self, round: Round, _account: Address) -> Result<ClaimEligibility> {
        self.calls.lock().checked.push(round);
        let script = self.script.lock();
        if script.failing_reads.contains(&round) {
            return Err(AdapterError::ContractError("claimable() reverted".to_string()));
        }
        Ok(ClaimEligibility {
            claimable: script.claimable.contains_key(&round),
            refundable: false,
        })
    }

    async fn ledger_entry(&self, round: Round, _account: Address) -> Result<LedgerEntry> {
        let script = self.script.lock();
        Ok(match script.claimable.get(&round) {
            Some(stake) => LedgerEntry {
                position: Some(Side::Bull),
                amount: *stake,
                claimed: false,
            },
            None => LedgerEntry::default(),
        })
    }

    async fn submit_claim(&self, rounds: &[Round]) -> Result<PendingTx> {
        self.calls.lock().claims.push(rounds.to_vec());
        let script = self.script.lock();
        if script.claim_fails {
            return Err(AdapterError::TransactionFailed("insufficient gas".to_string()));
        }
        Ok(ScriptedTx::confirmed(script.payouts.clone()))
    }

    async fn forward_round_starts(&self, sender: mpsc::UnboundedSender<Round>) -> Result<()> {
        let (signals, fails) = {
            let script = self.script.lock();
            (script.signals.clone(), script.signals_fail)
        };

        for round in signals {
            if sender.send(round).is_err() {
                return Ok(());
            }
        }

        if fails {
            return Err(AdapterError::SubscriptionError("filter expired".to_string()));
        }
        sender.closed().await;
        Ok(())
    }
}

/// In-memory signing account
pub struct MockWallet {
    address: Address,
    failing: HashSet<usize>,
    transfers: Mutex<Vec<(Address, U256)>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            address: Address::repeat_byte(0xaa),
            failing: HashSet::new(),
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// Make the `index`-th transfer (0-based) revert
    pub fn failing_transfer(mut self, index: usize) -> Self {
        self.failing.insert(index);
        self
    }

    /// Every attempted transfer, in order
    pub fn transfers(&self) -> Vec<(Address, U256)> {
        self.transfers.lock().clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTx> {
        let mut transfers = self.transfers.lock();
        let index = transfers.len();
        transfers.push((to, amount));
        if self.failing.contains(&index) {
            return Ok(ScriptedTx::reverted());
        }
        Ok(ScriptedTx::confirmed(Vec::new()))
    }
}

pub mod fixtures {
    //! Controller settings used across lifecycle tests

    use super::*;

    pub const STAKE: u64 = 1_000;
    pub const MIN_DUES: u64 = 10;

    pub fn dues_recipient() -> Address {
        Address::repeat_byte(0xdd)
    }

    pub fn settings(mode: StrategyMode) -> ControllerSettings {
        ControllerSettings {
            mode,
            ratio_threshold: 5,
            stake: U256::from(STAKE),
            claim_window: 5,
            dues: DuesCalculator::new(U256::from(MIN_DUES), dues_recipient()),
            initial_waiting_time: Duration::from_millis(21_000),
            min_waiting_time: Duration::from_millis(9_000),
            waiting_time_step: Duration::from_millis(6_000),
        }
    }

    pub fn controller(
        platform: &Arc<MockPlatform>,
        wallet: &Arc<MockWallet>,
        mode: StrategyMode,
    ) -> Arc<RoundController> {
        Arc::new(RoundController::new(
            Arc::clone(platform) as Arc<dyn PlatformAdapter>,
            Arc::clone(wallet) as Arc<dyn Wallet>,
            settings(mode),
        ))
    }
}
