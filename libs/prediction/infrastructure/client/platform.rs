//! Platform capability set
//!
//! One lifecycle algorithm drives every supported prediction contract; the
//! contracts differ only in call names and tuple layouts. Each adapter
//! implements [`PlatformAdapter`] and is injected as `Arc<dyn PlatformAdapter>`.

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{ClaimEligibility, LedgerEntry, PoolAmounts, Round, Side};

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Contract error: {0}")]
    ContractError(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    #[error("Transaction reverted: {0:?}")]
    Reverted(TxHash),
    #[error("Subscription error: {0}")]
    SubscriptionError(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Winnings realized by a claim, as reported by the contract's Claim event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub round: Round,
    pub amount: U256,
}

/// Confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub payouts: Vec<Payout>,
}

/// A broadcast transaction that has not been confirmed yet
#[async_trait]
pub trait PendingTransaction: Send {
    fn tx_hash(&self) -> TxHash;

    /// Wait until mined; a reverted transaction is an error
    async fn confirmation(self: Box<Self>) -> Result<Receipt>;
}

pub type PendingTx = Box<dyn PendingTransaction>;

/// Contract operations the round lifecycle needs
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform name for logging
    fn name(&self) -> &str;

    fn contract_address(&self) -> Address;

    async fn round_amounts(&self, round: Round) -> Result<PoolAmounts>;

    /// Broadcast a value-bearing bet; does not wait for confirmation
    async fn submit_bet(&self, round: Round, side: Side, stake: U256) -> Result<PendingTx>;

    async fn claim_eligibility(&self, round: Round, account: Address) -> Result<ClaimEligibility>;

    async fn ledger_entry(&self, round: Round, account: Address) -> Result<LedgerEntry>;

    /// Broadcast one claim covering every round in `rounds`
    async fn submit_claim(&self, rounds: &[Round]) -> Result<PendingTx>;

    /// Push every started round into `sender`
    ///
    /// Runs until the event stream ends (an error) or the receiver is dropped
    /// (a clean return).
    async fn forward_round_starts(&self, sender: mpsc::UnboundedSender<Round>) -> Result<()>;
}

/// Native-token transfers from the signing account
#[async_trait]
pub trait Wallet: Send + Sync {
    fn address(&self) -> Address;

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTx>;
}
