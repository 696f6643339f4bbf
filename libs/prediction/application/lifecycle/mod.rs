//! Per-round lifecycle state machine

mod controller;
mod state;

pub use controller::{ControllerSettings, RoundController};
pub use state::{DuesOutcome, RoundReport, RoundState};
