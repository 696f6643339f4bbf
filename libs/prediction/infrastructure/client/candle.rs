//! Candle Genie adapter
//!
//! Same round mechanics as PancakeSwap Prediction under different names:
//! `Rounds`, `Bets`, `user_BetBull`, `user_BetBear`, `user_Claim`. Pool
//! totals sit at indexes 1 (bull) and 2 (bear) of the `Rounds` tuple.

use async_trait::async_trait;
use ethers::contract::{abigen, parse_log};
use ethers::types::{Address, U256};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::chain::{ChainClient, PayoutDecoder, SignerClient};
use super::pancake::position_side;
use super::platform::{AdapterError, PendingTx, Payout, PlatformAdapter, Result};
use crate::domain::{ClaimEligibility, LedgerEntry, PoolAmounts, Round, Side};

pub const CANDLE_GENIE_CONTRACT: &str = "0x995294CdBfBf7784060BD3Bec05CE38a5F94A0C5";

abigen!(
    CandleGeniePrediction,
    r#"[
        function currentEpoch() external view returns (uint256)
        function Rounds(uint256 epoch) external view returns (uint256, uint256, uint256, uint256, uint256, int256, int256, uint32, uint32, uint32, uint32, uint32, bool, bool)
        function Bets(uint256 epoch, address user) external view returns (uint8, uint256, bool)
        function claimable(uint256 epoch, address user) external view returns (bool)
        function refundable(uint256 epoch, address user) external view returns (bool)
        function user_BetBull(uint256 epoch) external payable
        function user_BetBear(uint256 epoch) external payable
        function user_Claim(uint256[] calldata epochs) external
        event StartRound(uint256 indexed epoch)
        event Claim(address indexed sender, uint256 indexed epoch, uint256 amount)
    ]"#
);

pub struct CandleGenieAdapter {
    chain: ChainClient,
    contract: CandleGeniePrediction<SignerClient>,
    address: Address,
}

impl CandleGenieAdapter {
    pub fn new(chain: ChainClient) -> Result<Self> {
        let address: Address = CANDLE_GENIE_CONTRACT
            .parse()
            .map_err(|_| AdapterError::ContractError("Invalid prediction contract address".to_string()))?;
        Ok(Self::at(chain, address))
    }

    pub fn at(chain: ChainClient, address: Address) -> Self {
        let contract = CandleGeniePrediction::new(address, chain.client());
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
impl PlatformAdapter for CandleGenieAdapter {
    fn name(&self) -> &str {
        "Candle Genie"
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
        Ok(PoolAmounts::new(fields.1, fields.2))
    }

    async fn submit_bet(&self, round: Round, side: Side, stake: U256) -> Result<PendingTx> {
        let epoch = U256::from(round);
        let call = match side {
            Side::Bull => self.contract.user_bet_bull(epoch),
            Side::Bear => self.contract.user_bet_bear(epoch),
        }
        .value(stake);

        let pending = call
            .send()
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("[CandleGenie] {} bet sent for round {}: {:?}", side, round, tx_hash);
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
            .bets(U256::from(round), account)
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
        let call = self.contract.user_claim(epochs);
        let pending = call
            .send()
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("[CandleGenie] Claim sent for rounds {:?}: {:?}", rounds, tx_hash);
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
                Err(e) => warn!("[CandleGenie] Undecodable StartRound event: {}", e),
            }
        }

        Err(AdapterError::SubscriptionError(
            "StartRound event stream ended".to_string(),
        ))
    }
}
