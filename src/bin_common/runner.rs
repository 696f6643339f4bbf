//! Binary runner
//!
//! Shared startup and shutdown sequence for the platform binaries: parse
//! flags, load config, initialize logging, connect, then listen for rounds
//! until Ctrl+C.

use prediction::application::{init_logging_with_level, PredictionBot};
use prediction::{BotConfig, PlatformKind};
use tracing::{error, info};

use super::cli::parse_args;

/// Run the bot for `platform` until Ctrl+C or a fatal error
pub async fn run(platform: PlatformKind) -> anyhow::Result<()> {
    let args = parse_args();

    let config = BotConfig::load(args.config_path())?;
    init_logging_with_level(&config.tuning.log_level);
    config.log();

    let bot = PredictionBot::connect(&config, platform, args.strategy_mode()).await?;
    bot.shutdown().spawn_signal_handler();

    let result = bot.start().await;
    if let Err(e) = &result {
        error!("Round signal source failed: {}", e);
    }

    print_shutdown(platform, &bot);
    Ok(result?)
}

fn print_shutdown(platform: PlatformKind, bot: &PredictionBot) {
    let controller = bot.controller();
    info!("");
    info!("========================================");
    info!("{} bot stopped", platform);
    info!("  Rounds completed: {}", controller.rounds_completed());
    if !controller.in_flight().is_empty() {
        info!("  Abandoned in flight: {:?}", controller.in_flight());
    }
    info!("========================================");
}
