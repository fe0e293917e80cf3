//! Command-line argument parsing for the playground.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, YawMode};

/// quadsim command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "quad-playground", about = "Quadcopter flight playground")]
pub struct CliArgs {
    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Flight script (RON) to run instead of the built-in one.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Start with auto-balance disengaged.
    #[arg(long)]
    pub no_auto_balance: bool,

    /// Show or hide the drone-eye overlay at startup.
    #[arg(long)]
    pub pip: Option<bool>,

    /// Apply yaw as torque instead of a direct angular velocity.
    #[arg(long)]
    pub yaw_torque: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(frames) = args.frames {
            self.sim.frames = frames;
        }
        if args.no_auto_balance {
            self.flight.auto_balance = false;
        }
        if let Some(pip) = args.pip {
            self.pip.active = pip;
        }
        if args.yaw_torque {
            self.flight.yaw_mode = YawMode::Torque;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
