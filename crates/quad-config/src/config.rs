//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level playground configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window / viewport settings.
    pub window: WindowConfig,
    /// Flight dynamics tunables.
    pub flight: FlightTuning,
    /// Battery drain and charge rates.
    pub battery: BatteryConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Picture-in-picture drone camera settings.
    pub pip: PipConfig,
    /// Simulation loop settings.
    pub sim: SimConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in logical pixels.
    pub width: u32,
    /// Viewport height in logical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// How yaw input reaches the rigid body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum YawMode {
    /// Overwrite the body-up component of the angular velocity.
    #[default]
    AngularVelocity,
    /// Apply a body-up torque and let the integrator accumulate it.
    Torque,
}

/// Flight dynamics tunables.
///
/// Lift values are forces in newtons for a roughly 1 kg airframe; angular
/// values are torques (pitch/roll) or rates (yaw).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlightTuning {
    /// Height of the airframe when resting on the ground (meters).
    pub resting_height: f32,
    /// Altitude above which only the stable lift is available.
    pub max_altitude: f32,
    /// Lift that sustains a hover at full battery.
    pub stable_lift: f32,
    /// Lift available close to the ground at full battery.
    pub ample_lift: f32,
    /// Lift both references collapse to as the battery empties.
    pub failing_lift: f32,
    /// Lift lost per frame when not throttling.
    pub lift_decay_per_frame: f32,
    /// Share of lift pushed along the body's forward axis.
    pub forward_momentum: f32,
    /// Pitch torque at full stick deflection.
    pub max_pitch: f32,
    /// Roll torque at full stick deflection.
    pub max_roll: f32,
    /// Yaw rate at full stick deflection (rad/s).
    pub max_yaw: f32,
    /// Proportional gain of the auto-balance controller.
    pub balance_gain: f32,
    /// Altitude below which yaw is suppressed.
    pub maneuver_altitude: f32,
    /// Propeller spin rate at full battery (rad/s), visual only.
    pub propeller_speed: f32,
    /// Whether auto-balance is engaged at startup.
    pub auto_balance: bool,
    /// How yaw input is applied.
    pub yaw_mode: YawMode,
}

/// Battery configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatteryConfig {
    /// Charge at session start, in percent.
    pub initial_percentage: f32,
    /// Percentage lost per throttled frame.
    pub drain_per_frame: f32,
    /// Percentage gained per frame while docked on a station.
    pub charge_per_frame: f32,
}

/// Input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Radial deadzone applied to gamepad and touch sticks.
    pub joystick_deadzone: f32,
    /// Keybinding overrides (flight action name -> key name).
    pub keybindings: HashMap<String, String>,
}

/// Screen corner the PiP overlay is pinned to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PipAnchor {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    #[default]
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

/// Picture-in-picture configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipConfig {
    /// Whether the drone-eye overlay is shown at startup.
    pub active: bool,
    /// Corner the overlay is anchored to.
    pub anchor: PipAnchor,
    /// Distance from the anchored edges in pixels.
    pub margin_px: u32,
    /// Overlay width as a fraction of the viewport width.
    pub width_fraction: f32,
    /// Camera offset in the drone's local frame (meters).
    pub offset: [f32; 3],
    /// Downward tilt of the drone camera in degrees.
    pub tilt_deg: f32,
    /// Vertical field of view of the drone camera in degrees.
    pub fov_deg: f32,
}

/// Simulation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed simulation timestep in seconds.
    pub fixed_dt: f32,
    /// Number of frames the headless runner simulates.
    pub frames: u32,
    /// Minimum simulated time between telemetry samples.
    pub telemetry_interval_ms: u32,
    /// Drone spawn point (resting on the ground).
    pub spawn: [f32; 3],
    /// Charging station pad centers.
    pub stations: Vec<[f32; 3]>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "quadsim playground".to_string(),
        }
    }
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            resting_height: 0.2,
            max_altitude: 10.0,
            stable_lift: 9.81,
            ample_lift: 14.0,
            failing_lift: 6.0,
            lift_decay_per_frame: 0.2,
            forward_momentum: 0.02,
            max_pitch: 0.6,
            max_roll: 0.6,
            max_yaw: 2.0,
            balance_gain: 2.0,
            maneuver_altitude: 0.05,
            propeller_speed: 60.0,
            auto_balance: true,
            yaw_mode: YawMode::AngularVelocity,
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            initial_percentage: 100.0,
            drain_per_frame: 0.025,
            charge_per_frame: 0.1,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            joystick_deadzone: 0.15,
            keybindings: HashMap::new(),
        }
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            active: true,
            anchor: PipAnchor::TopRight,
            margin_px: 16,
            width_fraction: 0.25,
            offset: [0.0, -0.05, -0.12],
            tilt_deg: 15.0,
            fov_deg: 70.0,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            frames: 1800,
            telemetry_interval_ms: 100,
            spawn: [0.0, 0.1, 0.0],
            stations: vec![[0.0, 0.0, 0.0], [4.0, 0.0, -4.0]],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Platform config directory for quadsim (e.g. `~/.config/quadsim`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("quadsim"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.sim.fixed_dt;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "sim.fixed_dt",
                reason: "must be a finite number of seconds above zero",
            });
        }
        Ok(())
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
