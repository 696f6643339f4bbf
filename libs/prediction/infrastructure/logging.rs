//! Logging initialization and console sink

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::stdout;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing at `level`; `RUST_LOG` wins when set
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}

/// Console sink with the four severity channels used by the bot
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl Console {
    pub fn info(&self, message: impl AsRef<str>) {
        info!("{}", message.as_ref());
    }

    pub fn success(&self, message: impl AsRef<str>) {
        info!("✓ {}", message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        warn!("{}", message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        error!("{}", message.as_ref());
    }

    /// Clear the terminal; ignored when stdout is not a terminal
    pub fn clear(&self) {
        let _ = execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0));
    }
}
