//! Gamepad input wrapping [`gilrs`].
//!
//! [`GamepadManager`] drains gilrs events and hands them to a
//! [`PadTranslator`], which owns all the interpretation: connect events become
//! [`DeviceCapability::Gamepad`] notifications, stick motion becomes
//! [`StickSample`]s (left stick thrust/yaw, right stick pitch/roll), and face
//! buttons become [`FlightCommand`]s. The translator is hardware-free so it
//! can be driven directly in tests.

use crate::controls::{FlightCommand, Stick, StickSample, apply_radial_deadzone};
use crate::device::DeviceCapability;
use gilrs::{Axis, Button, EventType, Gilrs};
use glam::Vec2;
use std::collections::HashMap;

/// Stick axes the flight layout reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Buttons bound to flight commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadButton {
    /// Y / Triangle
    North,
    /// X / Square
    West,
    Select,
}

/// A gamepad event, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PadEvent {
    Connected { pad: usize, name: String },
    Disconnected { pad: usize },
    Axis { pad: usize, axis: PadAxis, value: f32 },
    ButtonPressed { pad: usize, button: PadButton },
}

/// What the rest of the input layer should do with a gamepad event.
#[derive(Debug, Clone, PartialEq)]
pub enum PadOutput {
    Device(DeviceCapability),
    Sample(StickSample),
    Command(FlightCommand),
}

#[derive(Debug, Clone, Copy, Default)]
struct RawSticks {
    left: Vec2,
    right: Vec2,
}

/// Turns [`PadEvent`]s into flight input.
#[derive(Debug, Clone)]
pub struct PadTranslator {
    deadzone: f32,
    pads: HashMap<usize, RawSticks>,
}

impl PadTranslator {
    pub fn new(deadzone: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 0.99),
            pads: HashMap::new(),
        }
    }

    pub fn connected_count(&self) -> usize {
        self.pads.len()
    }

    pub fn translate(&mut self, event: PadEvent) -> Vec<PadOutput> {
        match event {
            PadEvent::Connected { pad, name } => {
                tracing::info!("Gamepad {pad} connected: {name}");
                self.pads.insert(pad, RawSticks::default());
                vec![PadOutput::Device(DeviceCapability::Gamepad)]
            }
            PadEvent::Disconnected { pad } => {
                tracing::info!("Gamepad {pad} disconnected");
                // Sticks are shared; only the last pad to leave releases them.
                if self.pads.remove(&pad).is_none() || !self.pads.is_empty() {
                    return Vec::new();
                }
                vec![
                    PadOutput::Sample(StickSample::released(Stick::ThrustYaw)),
                    PadOutput::Sample(StickSample::released(Stick::PitchRoll)),
                ]
            }
            PadEvent::Axis { pad, axis, value } => {
                let deadzone = self.deadzone;
                let Some(sticks) = self.pads.get_mut(&pad) else {
                    return Vec::new();
                };
                let (stick, raw) = match axis {
                    PadAxis::LeftX => {
                        sticks.left.x = value;
                        (Stick::ThrustYaw, sticks.left)
                    }
                    PadAxis::LeftY => {
                        sticks.left.y = value;
                        (Stick::ThrustYaw, sticks.left)
                    }
                    PadAxis::RightX => {
                        sticks.right.x = value;
                        (Stick::PitchRoll, sticks.right)
                    }
                    PadAxis::RightY => {
                        sticks.right.y = value;
                        (Stick::PitchRoll, sticks.right)
                    }
                };
                let filtered = apply_radial_deadzone(raw, deadzone);
                let sample = if filtered == Vec2::ZERO {
                    StickSample::released(stick)
                } else {
                    StickSample::held(stick, filtered)
                };
                vec![PadOutput::Sample(sample)]
            }
            PadEvent::ButtonPressed { pad, button } => {
                if !self.pads.contains_key(&pad) {
                    return Vec::new();
                }
                let command = match button {
                    PadButton::North => FlightCommand::ToggleAutoBalance,
                    PadButton::West => FlightCommand::TogglePip,
                    PadButton::Select => FlightCommand::Reset,
                };
                vec![PadOutput::Command(command)]
            }
        }
    }
}

/// Owns the gilrs context and feeds its events through a [`PadTranslator`].
pub struct GamepadManager {
    gilrs: Gilrs,
    translator: PadTranslator,
    pending: Vec<PadOutput>,
}

impl GamepadManager {
    /// Initialise gilrs. Pads that are already plugged in are reported by the
    /// first [`poll`](Self::poll).
    pub fn new(deadzone: f32) -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        let mut translator = PadTranslator::new(deadzone);
        let mut pending = Vec::new();
        for (id, gamepad) in gilrs.gamepads().filter(|(_, g)| g.is_connected()) {
            pending.extend(translator.translate(PadEvent::Connected {
                pad: usize::from(id),
                name: gamepad.name().to_string(),
            }));
        }
        Ok(Self {
            gilrs,
            translator,
            pending,
        })
    }

    pub fn connected_count(&self) -> usize {
        self.translator.connected_count()
    }

    /// Drain pending gilrs events. Call once per frame.
    pub fn poll(&mut self) -> Vec<PadOutput> {
        let mut outputs = std::mem::take(&mut self.pending);
        while let Some(event) = self.gilrs.next_event() {
            let pad = usize::from(event.id);
            let translated = match event.event {
                EventType::Connected => Some(PadEvent::Connected {
                    pad,
                    name: self.gilrs.gamepad(event.id).name().to_string(),
                }),
                EventType::Disconnected => Some(PadEvent::Disconnected { pad }),
                EventType::AxisChanged(axis, value, _) => {
                    map_axis(axis).map(|axis| PadEvent::Axis { pad, axis, value })
                }
                EventType::ButtonPressed(button, _) => {
                    map_button(button).map(|button| PadEvent::ButtonPressed { pad, button })
                }
                _ => None,
            };
            if let Some(pad_event) = translated {
                outputs.extend(self.translator.translate(pad_event));
            }
        }
        outputs
    }
}

fn map_axis(axis: Axis) -> Option<PadAxis> {
    match axis {
        Axis::LeftStickX => Some(PadAxis::LeftX),
        Axis::LeftStickY => Some(PadAxis::LeftY),
        Axis::RightStickX => Some(PadAxis::RightX),
        Axis::RightStickY => Some(PadAxis::RightY),
        _ => None,
    }
}

fn map_button(button: Button) -> Option<PadButton> {
    match button {
        Button::North => Some(PadButton::North),
        Button::West => Some(PadButton::West),
        Button::Select => Some(PadButton::Select),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(deadzone: f32) -> PadTranslator {
        let mut t = PadTranslator::new(deadzone);
        t.translate(PadEvent::Connected {
            pad: 0,
            name: "Pad".into(),
        });
        t
    }

    #[test]
    fn test_connect_reports_gamepad_device() {
        let mut t = PadTranslator::new(0.15);
        let out = t.translate(PadEvent::Connected {
            pad: 3,
            name: "Xbox Controller".into(),
        });
        assert_eq!(out, vec![PadOutput::Device(DeviceCapability::Gamepad)]);
        assert_eq!(t.connected_count(), 1);
    }

    #[test]
    fn test_left_stick_drives_thrust_yaw() {
        let mut t = connected(0.0);
        t.translate(PadEvent::Axis {
            pad: 0,
            axis: PadAxis::LeftX,
            value: 0.5,
        });
        let out = t.translate(PadEvent::Axis {
            pad: 0,
            axis: PadAxis::LeftY,
            value: 0.5,
        });
        let PadOutput::Sample(sample) = &out[0] else {
            panic!("expected a stick sample, got {out:?}");
        };
        assert_eq!(sample.stick, Stick::ThrustYaw);
        assert!(sample.held);
        assert!((sample.value.x - 0.5).abs() < 1e-5);
        assert!((sample.value.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_deadzone_releases_stick() {
        let mut t = connected(0.15);
        let out = t.translate(PadEvent::Axis {
            pad: 0,
            axis: PadAxis::RightY,
            value: 0.1,
        });
        assert_eq!(
            out,
            vec![PadOutput::Sample(StickSample::released(Stick::PitchRoll))]
        );
    }

    #[test]
    fn test_unknown_pad_is_ignored() {
        let mut t = PadTranslator::new(0.15);
        let out = t.translate(PadEvent::Axis {
            pad: 9,
            axis: PadAxis::LeftY,
            value: 1.0,
        });
        assert!(out.is_empty());
    }

    #[test]
    fn test_disconnect_releases_both_sticks() {
        let mut t = connected(0.15);
        let out = t.translate(PadEvent::Disconnected { pad: 0 });
        assert_eq!(out.len(), 2);
        assert_eq!(t.connected_count(), 0);
        assert!(t.translate(PadEvent::Disconnected { pad: 0 }).is_empty());
    }

    #[test]
    fn test_disconnect_keeps_sticks_while_another_pad_remains() {
        let mut t = connected(0.15);
        t.translate(PadEvent::Connected {
            pad: 1,
            name: "Second pad".into(),
        });
        assert!(t.translate(PadEvent::Disconnected { pad: 0 }).is_empty());
        assert_eq!(t.connected_count(), 1);

        let out = t.translate(PadEvent::Disconnected { pad: 1 });
        assert_eq!(
            out,
            vec![
                PadOutput::Sample(StickSample::released(Stick::ThrustYaw)),
                PadOutput::Sample(StickSample::released(Stick::PitchRoll)),
            ]
        );
    }

    #[test]
    fn test_buttons_map_to_commands() {
        let mut t = connected(0.15);
        let out = t.translate(PadEvent::ButtonPressed {
            pad: 0,
            button: PadButton::North,
        });
        assert_eq!(out, vec![PadOutput::Command(FlightCommand::ToggleAutoBalance)]);
    }
}
