//! Headless quadcopter playground.
//!
//! Loads the config, replays a flight script against the full flight loop,
//! and logs telemetry as JSON lines.
//!
//! Run with: `cargo run -p quad-app -- --frames 900`

use std::process::ExitCode;

use clap::Parser;
use quad_app::{AppError, FlightScript, Playground, RunSummary};
use quad_config::{CliArgs, Config};
use quad_input::GamepadManager;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let (mut config, config_error) = load_config(&args);
    config.apply_cli_overrides(&args);

    quad_log::init_logging(
        config.debug.log_dir.as_deref(),
        cfg!(debug_assertions),
        Some(&config),
    );
    if let Some(err) = config_error {
        warn!("Using default config: {err}");
    }

    match run(&config, &args) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(err) => warn!("Failed to encode summary: {err}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &CliArgs) -> (Config, Option<AppError>) {
    let dir = match args.config.clone().map_or_else(Config::default_dir, Ok) {
        Ok(dir) => dir,
        Err(err) => return (Config::default(), Some(err.into())),
    };
    match Config::load_or_create(&dir) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err.into())),
    }
}

fn run(config: &Config, args: &CliArgs) -> Result<RunSummary, AppError> {
    let script = match &args.script {
        Some(path) => FlightScript::load(path)?,
        None => FlightScript::builtin(),
    };

    info!(
        "Quadcopter playground: {} frames at {:.1} Hz",
        config.sim.frames,
        1.0 / config.sim.fixed_dt
    );

    let mut playground = Playground::new(config).with_script(script);
    match GamepadManager::new(config.input.joystick_deadzone) {
        Ok(gamepads) => playground.attach_gamepads(gamepads),
        Err(err) => warn!("Gamepad support unavailable: {err}"),
    }

    playground.run(config.sim.frames)
}
