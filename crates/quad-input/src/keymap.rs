//! Keyboard flight layout: maps [`FlightAction`]s to physical keys and turns
//! the held keys into [`ControlInputs`].

use crate::controls::{ControlInputs, FlightCommand};
use crate::keyboard::KeyboardState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Serde helper for [`KeyCode`], which has no serde impl of its own.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    pub fn serialize<S: Serializer>(codes: &[KeyCode], s: S) -> Result<S::Ok, S::Error> {
        codes
            .iter()
            .map(|code| format!("{code:?}"))
            .collect::<Vec<_>>()
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<KeyCode>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|name| {
                super::key_from_name(name)
                    .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
            })
            .collect()
    }
}

/// Parse a key by its `KeyCode` debug name (`"KeyW"`, `"ArrowUp"`, ...).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Numpad2" => KeyCode::Numpad2,
        "Numpad4" => KeyCode::Numpad4,
        "Numpad6" => KeyCode::Numpad6,
        "Numpad8" => KeyCode::Numpad8,
        _ => return None,
    })
}

/// Everything the keyboard can do to the drone.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FlightAction {
    ThrottleUp,
    ThrottleDown,
    YawLeft,
    YawRight,
    PitchForward,
    PitchBack,
    RollLeft,
    RollRight,
    ToggleAutoBalance,
    TogglePip,
    Reset,
}

impl FlightAction {
    pub const ALL: [FlightAction; 11] = [
        Self::ThrottleUp,
        Self::ThrottleDown,
        Self::YawLeft,
        Self::YawRight,
        Self::PitchForward,
        Self::PitchBack,
        Self::RollLeft,
        Self::RollRight,
        Self::ToggleAutoBalance,
        Self::TogglePip,
        Self::Reset,
    ];

    /// Look an action up by its variant name, as used in config overrides.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| format!("{action:?}") == name)
    }

    fn command(self) -> Option<FlightCommand> {
        match self {
            Self::ToggleAutoBalance => Some(FlightCommand::ToggleAutoBalance),
            Self::TogglePip => Some(FlightCommand::TogglePip),
            Self::Reset => Some(FlightCommand::Reset),
            _ => None,
        }
    }
}

/// Serializable binding table from action to keys (OR logic per action).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightKeymap {
    bindings: HashMap<FlightAction, KeyList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct KeyList(#[serde(with = "keycode_serde")] Vec<KeyCode>);

impl Default for FlightKeymap {
    /// W/S throttle, A/D yaw, arrows pitch and roll.
    fn default() -> Self {
        let mut map = Self {
            bindings: HashMap::new(),
        };
        map.bind(FlightAction::ThrottleUp, &[KeyCode::KeyW]);
        map.bind(FlightAction::ThrottleDown, &[KeyCode::KeyS]);
        map.bind(FlightAction::YawLeft, &[KeyCode::KeyA]);
        map.bind(FlightAction::YawRight, &[KeyCode::KeyD]);
        map.bind(FlightAction::PitchForward, &[KeyCode::ArrowUp, KeyCode::Numpad8]);
        map.bind(FlightAction::PitchBack, &[KeyCode::ArrowDown, KeyCode::Numpad2]);
        map.bind(FlightAction::RollLeft, &[KeyCode::ArrowLeft, KeyCode::Numpad4]);
        map.bind(FlightAction::RollRight, &[KeyCode::ArrowRight, KeyCode::Numpad6]);
        map.bind(FlightAction::ToggleAutoBalance, &[KeyCode::KeyB]);
        map.bind(FlightAction::TogglePip, &[KeyCode::KeyP]);
        map.bind(FlightAction::Reset, &[KeyCode::KeyR]);
        map
    }
}

impl FlightKeymap {
    /// Replace the keys bound to `action`.
    pub fn bind(&mut self, action: FlightAction, keys: &[KeyCode]) {
        self.bindings.insert(action, KeyList(keys.to_vec()));
    }

    pub fn keys(&self, action: FlightAction) -> &[KeyCode] {
        self.bindings
            .get(&action)
            .map(|list| list.0.as_slice())
            .unwrap_or(&[])
    }

    /// Apply `action name -> key name` overrides from the config.
    ///
    /// Each override replaces the action's keys with the single named key.
    /// Entries that do not parse are skipped and returned for reporting.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut rejected = Vec::new();
        for (action_name, key_name) in overrides {
            match (FlightAction::from_name(action_name), key_from_name(key_name)) {
                (Some(action), Some(key)) => self.bind(action, &[key]),
                _ => {
                    tracing::warn!("Ignoring keybinding override {action_name} -> {key_name}");
                    rejected.push(action_name.clone());
                }
            }
        }
        rejected.sort();
        rejected
    }

    fn held(&self, keyboard: &KeyboardState, action: FlightAction) -> bool {
        self.keys(action).iter().any(|&key| keyboard.is_pressed(key))
    }

    /// Build this frame's keyboard-derived controls.
    ///
    /// A gate is active while either of its two keys is held; opposing keys
    /// cancel to a zero axis with the gate still active.
    pub fn control_inputs(&self, keyboard: &KeyboardState) -> ControlInputs {
        let pair = |pos: FlightAction, neg: FlightAction| {
            let (p, n) = (self.held(keyboard, pos), self.held(keyboard, neg));
            (p || n, f32::from(u8::from(p)) - f32::from(u8::from(n)))
        };

        let (throttling, thrust_axis) = pair(FlightAction::ThrottleUp, FlightAction::ThrottleDown);
        let (yawing, yaw_axis) = pair(FlightAction::YawRight, FlightAction::YawLeft);
        let (pitching, pitch_axis) = pair(FlightAction::PitchForward, FlightAction::PitchBack);
        let (rolling, roll_axis) = pair(FlightAction::RollRight, FlightAction::RollLeft);

        ControlInputs {
            throttling,
            pitching,
            rolling,
            yawing,
            pitch_axis,
            roll_axis,
            yaw_axis,
            thrust_axis,
        }
    }

    /// Commands whose key went down this frame.
    pub fn commands(&self, keyboard: &KeyboardState) -> Vec<FlightCommand> {
        FlightAction::ALL
            .into_iter()
            .filter_map(|action| {
                let command = action.command()?;
                self.keys(action)
                    .iter()
                    .any(|&key| keyboard.just_pressed(key))
                    .then_some(command)
            })
            .collect()
    }
}
