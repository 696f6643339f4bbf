//! Chain client
//!
//! Signer, provider and transaction plumbing shared by both platform
//! adapters. Nonces are assigned by the node through `SignerMiddleware` at
//! send time, so concurrent submissions from different rounds are ordered by
//! the provider, not by this crate.

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer, WalletError};
use ethers::types::{Address, Log, TransactionRequest, TxHash, U256, U64};
use ethers::utils::format_ether;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::platform::{AdapterError, PendingTransaction, PendingTx, Payout, Receipt, Result, Wallet};

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Extracts this account's payouts from a receipt log
pub type PayoutDecoder = Arc<dyn Fn(&Log) -> Option<Payout> + Send + Sync>;

/// Connected signer for one account on one chain
#[derive(Clone)]
pub struct ChainClient {
    client: Arc<SignerClient>,
}

impl ChainClient {
    /// Connect to `rpc_url` and bind the signing key to the node's chain id
    pub async fn connect(private_key: &str, rpc_url: &str, poll_interval: Duration) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| AdapterError::ProviderError(e.to_string()))?
            .interval(poll_interval);

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| AdapterError::ProviderError(format!("Provider unreachable: {}", e)))?;

        let wallet: LocalWallet = private_key
            .trim_start_matches("0x")
            .parse()
            .map_err(|e: WalletError| AdapterError::ProviderError(e.to_string()))?;
        let wallet = wallet.with_chain_id(chain_id.as_u64());

        debug!("[Chain] Connected to chain {} as {:?}", chain_id, wallet.address());

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
        })
    }

    pub fn client(&self) -> Arc<SignerClient> {
        Arc::clone(&self.client)
    }

    pub fn account(&self) -> Address {
        self.client.address()
    }

    /// Native balance of the signing account
    pub async fn balance(&self) -> Result<U256> {
        self.client
            .get_balance(self.account(), None)
            .await
            .map_err(|e| AdapterError::ProviderError(e.to_string()))
    }

    /// Track a broadcast transaction without decoding payouts
    pub fn track(&self, tx_hash: TxHash) -> PendingTx {
        Box::new(ChainTransaction::new(self.client(), tx_hash, None))
    }

    /// Track a broadcast claim, decoding payouts from its receipt logs
    pub fn track_with_payouts(&self, tx_hash: TxHash, decoder: PayoutDecoder) -> PendingTx {
        Box::new(ChainTransaction::new(self.client(), tx_hash, Some(decoder)))
    }
}

#[async_trait]
impl Wallet for ChainClient {
    fn address(&self) -> Address {
        self.account()
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTx> {
        let request = TransactionRequest::new().to(to).value(amount);
        let pending = self
            .client
            .send_transaction(request, None)
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?;
        Ok(self.track(pending.tx_hash()))
    }
}

/// Broadcast transaction awaiting its receipt
pub struct ChainTransaction {
    client: Arc<SignerClient>,
    tx_hash: TxHash,
    decoder: Option<PayoutDecoder>,
}

impl ChainTransaction {
    pub fn new(client: Arc<SignerClient>, tx_hash: TxHash, decoder: Option<PayoutDecoder>) -> Self {
        Self {
            client,
            tx_hash,
            decoder,
        }
    }
}

#[async_trait]
impl PendingTransaction for ChainTransaction {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirmation(self: Box<Self>) -> Result<Receipt> {
        let receipt = ethers::providers::PendingTransaction::new(self.tx_hash, self.client.provider())
            .await
            .map_err(|e| AdapterError::TransactionFailed(e.to_string()))?
            .ok_or_else(|| AdapterError::TransactionFailed(format!("No receipt. TX: {:?}", self.tx_hash)))?;

        if receipt.status != Some(U64::from(1)) {
            return Err(AdapterError::Reverted(self.tx_hash));
        }

        let payouts = match &self.decoder {
            Some(decode) => receipt.logs.iter().filter_map(|log| decode(log)).collect(),
            None => Vec::new(),
        };

        Ok(Receipt {
            tx_hash: self.tx_hash,
            payouts,
        })
    }
}

/// Convert wei to a decimal native-token amount
pub fn from_wei(amount: U256) -> String {
    format_ether(amount)
}
