//! Application Layer
//!
//! Contains use cases and application services.
//! This layer depends on domain and infrastructure layers.

pub mod facade;
pub mod lifecycle;
pub mod scanner;
pub mod waiting_time;

// Re-export application facade for binaries
pub use facade::{init_logging_with_level, PredictionBot};

// Re-export lifecycle
pub use lifecycle::{ControllerSettings, DuesOutcome, RoundController, RoundReport, RoundState};

pub use scanner::{ClaimWindowScanner, DEFAULT_CLAIM_WINDOW};
pub use waiting_time::WaitingTime;
