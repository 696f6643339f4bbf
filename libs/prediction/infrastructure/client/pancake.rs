//! PancakeSwap Prediction V2 adapter
//!
//! BNB/USD prediction rounds on BNB Smart Chain.
//!
//! # Contract surface
//!
//! - `rounds(epoch)` returns a 14-field tuple; pool totals are
//!   `bullAmount` (index 9) and `bearAmount` (index 10)
//! - `ledger(epoch, user)` returns `(position, amount, claimed)`, position
//!   0 = Bull, 1 = Bear
//! - `betBull` / `betBear` are payable, the stake travels as `msg.value`
//! - `claim(epochs)` emits one `Claim(sender, epoch, amount)` per epoch

use async_trait::async_trait;
use ethers::contract::{abigen, parse_log};
use ethers::types::{Address, U256};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::chain::{ChainClient, PayoutDecoder, SignerClient};
use super::platform::{AdapterError, PendingTx, Payout, PlatformAdapter, Result};
use crate::domain::{ClaimEligibility, LedgerEntry, PoolAmounts, Round, Side};

pub const PANCAKE_PREDICTION_CONTRACT: &str = "0x18B2A687610328590Bc8F2e5fEdDe3b582A49cdA";

abigen!(
    PancakePredictionV2,
    r#"[
        function rounds(uint256 epoch) external view returns (uint256, uint256, uint256, uint256, int256, int256, uint256, uint256, uint256, uint256, uint256, uint256, uint256, bool)
        function ledger(uint256 epoch, address user) external view returns (uint8, uint256, bool)
        function claimable(uint256 epoch, address user) external view returns (bool)
        function refundable(uint256 epoch, address user) external view returns (bool)
        function betBull(uint256 epoch) external payable
        function betBear(uint256 epoch) external payable
        function claim(uint256[] calldata epochs) external
        event StartRound(uint256 indexed epoch)
        event Claim(address indexed sender, uint256 indexed epoch, uint256 amount)
    ]"#
);

pub struct PancakeAdapter {
    chain: ChainClient,
    contract: PancakePredictionV2<SignerClient>,
    address: Address,
}

impl PancakeAdapter {
    pub fn new(chain: ChainClient) -> Result<Self> {
        let address: Address = PANCAKE_PREDICTION_CONTRACT
            .parse()
            .map_err(|_| AdapterError::ContractError("Invalid prediction contract address".to_string()))?;
        Ok(Self::at(chain, address))
    }

    /// Bind to a specific deployment
    pub fn at(chain: ChainClient, address: Address) -> Self {
        let contract = PancakePredictionV2::new(address, chain.client());
        Self {
            chain,
            contract,
            address,
        }
    }

    fn claim_decoder(&self) -> PayoutDecoder {
        let contract = self.address;
        let account = self.chain.account();
        Arc::new(move |log| {
            if log.address != contract {
                return None;
            }
            let event = parse_log::<ClaimFilter>(log.clone()).ok()?;
            (event.sender == account).then(|| Payout {
                round: event.epoch.low_u64(),
                amount: event.amount,
            })
        })
    }
}

#[async_trait]
impl PlatformAdapter for PancakeAdapter {
    fn name(&self) -> &str {
        "PancakeSwap Prediction"
    }

    fn contract_address(&self) -> Address {
        self.address
    }

    async fn round_amounts(&self, round: Round) -> Result<PoolAmounts> {
        let fields = self
            .contract
            .rounds(U256::from(round))
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(e.to_string()))?;
        Ok(PoolAmounts::new(fields.9, fields.10))
    }

    async fn submit_bet(&self, round: Round, side: Side, stake: U256) -> Result<PendingTx> {
        let epoch = U256::from(round);
        let call = match side {
            Side::Bull => self.contract.bet_bull(epoch),
            Side::Bear => self.contract.bet_bear(epoch),
        }
        .value(stake);

        let pending = call
            .send()
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("[Pancake] {} bet sent for round {}: {:?}", side, round, tx_hash);
        Ok(self.chain.track(tx_hash))
    }

    async fn claim_eligibility(&self, round: Round, account: Address) -> Result<ClaimEligibility> {
        let epoch = U256::from(round);
        let claimable = self.contract.claimable(epoch, account);
        let refundable = self.contract.refundable(epoch, account);
        let (claimable, refundable) = tokio::try_join!(claimable.call(), refundable.call())
            .map_err(|e| AdapterError::ContractError(e.to_string()))?;
        Ok(ClaimEligibility {
            claimable,
            refundable,
        })
    }

    async fn ledger_entry(&self, round: Round, account: Address) -> Result<LedgerEntry> {
        let (position, amount, claimed) = self
            .contract
            .ledger(U256::from(round), account)
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(e.to_string()))?;
        Ok(LedgerEntry {
            position: position_side(position, amount),
            amount,
            claimed,
        })
    }

    async fn submit_claim(&self, rounds: &[Round]) -> Result<PendingTx> {
        let epochs: Vec<U256> = rounds.iter().copied().map(U256::from).collect();
        let call = self.contract.claim(epochs);
        let pending = call
            .send()
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("[Pancake] Claim sent for rounds {:?}: {:?}", rounds, tx_hash);
        Ok(self.chain.track_with_payouts(tx_hash, self.claim_decoder()))
    }

    async fn forward_round_starts(&self, sender: mpsc::UnboundedSender<Round>) -> Result<()> {
        let event = self.contract.event::<StartRoundFilter>();
        let mut stream = event
            .stream()
            .await
            .map_err(|e| AdapterError::SubscriptionError(e.to_string()))?;

        while let Some(item) = stream.next().await {
            match item {
                Ok(started) => {
                    if sender.send(started.epoch.low_u64()).is_err() {
                        return Ok(());
                    }
                }
                Err(e) => warn!("[Pancake] Undecodable StartRound event: {}", e),
            }
        }

        Err(AdapterError::SubscriptionError(
            "StartRound event stream ended".to_string(),
        ))
    }
}

/// Ledger position; a ledger without stake has no position
pub(crate) fn position_side(position: u8, amount: U256) -> Option<Side> {
    if amount.is_zero() {
        return None;
    }
    match position {
        0 => Some(Side::Bull),
        1 => Some(Side::Bear),
        _ => None,
    }
}
