//! Normalized flight controls shared by every input device.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One frame's worth of normalized flight input.
///
/// Gates say whether a control is being actively driven; axes carry the
/// deflection in `[-1, 1]`. Built fresh every frame, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    pub throttling: bool,
    pub pitching: bool,
    pub rolling: bool,
    pub yawing: bool,
    /// Forward (+) / back (-) stick deflection.
    pub pitch_axis: f32,
    /// Right (+) / left (-) stick deflection.
    pub roll_axis: f32,
    /// Right (+) / left (-) yaw deflection.
    pub yaw_axis: f32,
    /// Up (+) / down (-) throttle deflection.
    pub thrust_axis: f32,
}

impl ControlInputs {
    /// No gates active, all axes centered.
    pub const NEUTRAL: Self = Self {
        throttling: false,
        pitching: false,
        rolling: false,
        yawing: false,
        pitch_axis: 0.0,
        roll_axis: 0.0,
        yaw_axis: 0.0,
        thrust_axis: 0.0,
    };

    /// Returns a copy with every axis clamped to `[-1, 1]` and NaN mapped to 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            pitch_axis: clamp_axis(self.pitch_axis),
            roll_axis: clamp_axis(self.roll_axis),
            yaw_axis: clamp_axis(self.yaw_axis),
            thrust_axis: clamp_axis(self.thrust_axis),
            ..self
        }
    }

    /// Write one stick's sample into the matching gates and axes.
    ///
    /// The thrust/yaw stick maps `x` to yaw and `y` to thrust; the
    /// pitch/roll stick maps `x` to roll and `y` to pitch. A released stick
    /// clears its gates and recenters its axes.
    pub fn apply_stick(&mut self, sample: StickSample) {
        let value = if sample.held {
            Vec2::new(clamp_axis(sample.value.x), clamp_axis(sample.value.y))
        } else {
            Vec2::ZERO
        };
        match sample.stick {
            Stick::ThrustYaw => {
                self.throttling = sample.held;
                self.yawing = sample.held;
                self.yaw_axis = value.x;
                self.thrust_axis = value.y;
            }
            Stick::PitchRoll => {
                self.pitching = sample.held;
                self.rolling = sample.held;
                self.roll_axis = value.x;
                self.pitch_axis = value.y;
            }
        }
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// The two logical sticks of a mode-2 transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    /// Left stick: yaw on x, thrust on y.
    ThrustYaw,
    /// Right stick: roll on x, pitch on y.
    PitchRoll,
}

/// A single write from a joystick-class device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickSample {
    pub stick: Stick,
    /// Deflection, y up, each component in `[-1, 1]`.
    pub value: Vec2,
    /// Whether the stick is currently being driven.
    pub held: bool,
}

impl StickSample {
    /// A driven stick at `value`.
    pub fn held(stick: Stick, value: Vec2) -> Self {
        Self {
            stick,
            value,
            held: true,
        }
    }

    /// A released, recentered stick.
    pub fn released(stick: Stick) -> Self {
        Self {
            stick,
            value: Vec2::ZERO,
            held: false,
        }
    }
}

/// Discrete, edge-triggered commands issued alongside the continuous controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightCommand {
    ToggleAutoBalance,
    TogglePip,
    Reset,
}

/// Radial deadzone with rescaling.
///
/// Vectors shorter than `deadzone` collapse to zero; longer ones are rescaled
/// so the usable range starts at 0 and saturates at length 1.
pub fn apply_radial_deadzone(raw: Vec2, deadzone: f32) -> Vec2 {
    let deadzone = deadzone.clamp(0.0, 0.99);
    let len = raw.length();
    if len < deadzone || len == 0.0 {
        return Vec2::ZERO;
    }
    let rescaled = ((len - deadzone) / (1.0 - deadzone)).min(1.0);
    raw / len * rescaled
}
