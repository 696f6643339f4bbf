//! Application Facade
//!
//! Public API for binaries (presentation layer). Wires the chain client, one
//! platform adapter and the round controller, then feeds round-start signals
//! into the controller until stopped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::lifecycle::{ControllerSettings, RoundController};
use crate::domain::StrategyMode;
use crate::infrastructure::client::{
    from_wei, AdapterError, ChainClient, PlatformAdapter, PlatformKind, Wallet,
};
use crate::infrastructure::config::BotConfig;
use crate::infrastructure::logging::{init_tracing_with_level, Console};
use crate::utils::{Heartbeat, ShutdownManager};

/// Initialize logging for binaries
pub fn init_logging_with_level(level: &str) {
    init_tracing_with_level(level);
}

/// Application facade for the prediction bot
pub struct PredictionBot {
    platform: Arc<dyn PlatformAdapter>,
    controller: Arc<RoundController>,
    shutdown: ShutdownManager,
    heartbeat_secs: u64,
    console: Console,
}

impl PredictionBot {
    /// Connect to the chain and bind the selected platform
    pub async fn connect(
        config: &BotConfig,
        platform: PlatformKind,
        mode: StrategyMode,
    ) -> anyhow::Result<Self> {
        let chain = ChainClient::connect(
            &config.private_key,
            &config.rpc_url,
            config.tuning.poll_interval(),
        )
        .await?;

        let adapter = platform.adapter(chain.clone())?;
        let settings = ControllerSettings::from_config(config, mode)?;
        let wallet: Arc<dyn Wallet> = Arc::new(chain.clone());
        let controller = Arc::new(RoundController::new(Arc::clone(&adapter), wallet, settings));

        let bot = Self::new(adapter, controller, config.tuning.heartbeat_secs);

        let balance = chain.balance().await?;
        bot.print_banner(&chain, balance);
        Ok(bot)
    }

    /// Assemble from already-built parts
    pub fn new(
        platform: Arc<dyn PlatformAdapter>,
        controller: Arc<RoundController>,
        heartbeat_secs: u64,
    ) -> Self {
        Self {
            platform,
            controller,
            shutdown: ShutdownManager::new(),
            heartbeat_secs,
            console: Console,
        }
    }

    pub fn controller(&self) -> &Arc<RoundController> {
        &self.controller
    }

    pub fn shutdown(&self) -> &ShutdownManager {
        &self.shutdown
    }

    /// Check if the bot is still accepting rounds
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Forward round-start signals into the controller until stopped
    ///
    /// Returns an error only when the platform's signal source fails. Round
    /// lifecycles already in flight keep running after this returns.
    pub async fn start(&self) -> Result<(), AdapterError> {
        let (sender, mut rounds) = mpsc::unbounded_channel();
        let platform = Arc::clone(&self.platform);
        let mut forwarder = tokio::spawn(async move { platform.forward_round_starts(sender).await });

        let mut heartbeat = Heartbeat::new(self.heartbeat_secs);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));

        self.console
            .info(format!("Listening for rounds on {}", self.platform.name()));

        let result = loop {
            tokio::select! {
                _ = self.shutdown.wait() => {
                    forwarder.abort();
                    break Ok(());
                }
                signal = rounds.recv() => match signal {
                    Some(round) => {
                        self.controller.spawn_round(round);
                    }
                    None => {
                        break match (&mut forwarder).await {
                            Ok(result) => result,
                            Err(e) => Err(AdapterError::SubscriptionError(e.to_string())),
                        };
                    }
                },
                _ = ticker.tick() => {
                    if heartbeat.tick() {
                        self.log_status();
                    }
                }
            }
        };

        info!("Stopped listening for rounds");
        result
    }

    /// Stop accepting new rounds
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    fn log_status(&self) {
        info!(
            waiting_ms = self.controller.waiting_time().as_millis() as u64,
            in_flight = ?self.controller.in_flight(),
            completed = self.controller.rounds_completed(),
            "Status"
        );
    }

    fn print_banner(&self, chain: &ChainClient, balance: ethers::types::U256) {
        self.console.clear();
        self.console.info("========================================");
        self.console.info(format!("{} Bot", self.platform.name()));
        self.console
            .info(format!("  Contract: {:?}", self.platform.contract_address()));
        self.console.info(format!("  Strategy: {}", self.controller.mode()));
        self.console.info(format!("  Wallet: {:?}", chain.account()));
        self.console.info(format!("  Balance: {}", from_wei(balance)));
        self.console.info(format!("  Bet amount: {}", from_wei(self.controller.stake())));
        self.console
            .info(format!("  Waiting time: {}ms", self.controller.waiting_time().as_millis()));
        self.console.info("  Press Ctrl+C to stop");
        self.console.info("========================================");
        if balance < self.controller.stake() {
            self.console
                .warn("Balance is below the bet amount, bets will fail until the wallet is funded");
        }
    }
}
