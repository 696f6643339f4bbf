//! Candle Genie bot
//!
//! Usage:
//!   ./candle-bot          # bet against the crowd
//!   ./candle-bot --with   # bet with the crowd

use prediction_round_bot::bin_common::run;
use prediction_round_bot::prediction::PlatformKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(PlatformKind::CandleGenie).await
}
