//! Scripted flights.
//!
//! A [`FlightScript`] is a RON list of frame-stamped actions that stand in
//! for a pilot: device notifications, key presses, stick samples, touches and
//! commands. The headless playground replays one deterministically.

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::*;
use quad_input::{FlightCommand, Stick, key_from_name};
use serde::{Deserialize, Serialize};

/// Script loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read flight script {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse flight script: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("step at frame {frame} names unknown key {key:?}")]
    UnknownKey { frame: u64, key: String },
}

/// Touch lifecycle in script form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchKind {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptAction {
    /// Device-change notification by tag (`"keyboard"`, `"touch"`, ...).
    Device(String),
    /// Key down, by `KeyCode` name (`"KeyW"`).
    Press(String),
    Release(String),
    /// Joystick write: stick held at `(x, y)`.
    Stick { stick: Stick, x: f32, y: f32 },
    ReleaseStick(Stick),
    /// Touch event in screen pixels, routed to the on-screen sticks.
    Touch {
        id: u64,
        phase: TouchKind,
        x: f32,
        y: f32,
    },
    Command(FlightCommand),
    /// Free-form marker written to the log.
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub frame: u64,
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightScript {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl FlightScript {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&contents)
    }

    /// Parse, validate key names, and order steps by frame.
    pub fn from_ron(contents: &str) -> Result<Self, ScriptError> {
        let mut script: FlightScript = ron::from_str(contents)?;
        script.validate()?;
        // Stable: steps sharing a frame keep their written order.
        script.steps.sort_by_key(|step| step.frame);
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        for step in &self.steps {
            if let ScriptAction::Press(key) | ScriptAction::Release(key) = &step.action
                && key_from_name(key).is_none()
            {
                return Err(ScriptError::UnknownKey {
                    frame: step.frame,
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Last frame any step fires on.
    pub fn last_frame(&self) -> u64 {
        self.steps.iter().map(|s| s.frame).max().unwrap_or(0)
    }

    /// Take off from the pad on the keyboard, hover and yaw on the gamepad
    /// stick, toggle the onboard view, then descend and cut power.
    pub fn builtin() -> Self {
        use ScriptAction as A;
        let step = |frame, action| ScriptStep { frame, action };
        let thrust = |x, y| A::Stick {
            stick: Stick::ThrustYaw,
            x,
            y,
        };
        Self {
            name: "pad-hop".into(),
            steps: vec![
                step(0, A::Device("keyboard".into())),
                step(1, A::Note("takeoff".into())),
                step(1, A::Press("KeyW".into())),
                step(50, A::Release("KeyW".into())),
                step(60, A::Device("gamepad".into())),
                step(60, A::Note("hover".into())),
                step(60, thrust(0.0, 0.75)),
                step(240, thrust(0.5, 0.75)),
                step(300, thrust(0.0, 0.75)),
                step(360, A::Command(FlightCommand::TogglePip)),
                step(420, A::Command(FlightCommand::TogglePip)),
                step(480, A::Note("descend".into())),
                step(480, thrust(0.0, 0.6)),
                step(720, A::ReleaseStick(Stick::ThrustYaw)),
                step(720, A::Note("power off".into())),
            ],
        }
    }
}

/// Replays a script one frame at a time.
#[derive(Resource, Debug, Clone)]
pub struct ScriptPlayer {
    script: FlightScript,
    cursor: usize,
}

impl ScriptPlayer {
    pub fn new(script: FlightScript) -> Self {
        Self { script, cursor: 0 }
    }

    pub fn name(&self) -> &str {
        &self.script.name
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.script.steps.len()
    }

    /// Actions due at or before `frame` that have not fired yet.
    pub fn due(&mut self, frame: u64) -> Vec<ScriptAction> {
        let start = self.cursor;
        while self
            .script
            .steps
            .get(self.cursor)
            .is_some_and(|step| step.frame <= frame)
        {
            self.cursor += 1;
        }
        self.script.steps[start..self.cursor]
            .iter()
            .map(|step| step.action.clone())
            .collect()
    }
}
