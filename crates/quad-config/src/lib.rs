//! Configuration system for quadsim.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! with CLI overrides via clap and forward/backward compatible serialization.
//! Flight tunables live here so a scene can be retuned without a rebuild.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BatteryConfig, Config, DebugConfig, FlightTuning, InputConfig, PipAnchor, PipConfig,
    SimConfig, WindowConfig, YawMode,
};
pub use error::ConfigError;
