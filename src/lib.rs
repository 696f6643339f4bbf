//! Prediction Round Bot - Main Library
//!
//! Re-exports the workspace library and hosts the code shared by the
//! platform binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: CLI flags and the shared runner
//! - **prediction**: core business logic (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use prediction_round_bot::bin_common::run;
//! use prediction_round_bot::prediction::PlatformKind;
//!
//! run(PlatformKind::Pancake).await
//! ```

// Re-export workspace library for convenience
pub use prediction;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, BotArgs, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
    pub use runner::run;
}
