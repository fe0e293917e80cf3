//! Control source arbitration between keyboard and joystick-class devices.

use quad_input::DeviceCapability;
use serde::Serialize;

/// Which input path drives the drone this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlSource {
    Keyboard,
    /// Touch stick, pointer stick, or gamepad.
    Joystick,
    /// No device has connected yet.
    None,
}

/// The two activation flags. At most one is ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSourceState {
    keyboard_active: bool,
    joystick_active: bool,
}

impl ControlSourceState {
    pub fn keyboard_active(&self) -> bool {
        self.keyboard_active
    }

    pub fn joystick_active(&self) -> bool {
        self.joystick_active
    }
}

/// Flips [`ControlSourceState`] on device-change notifications.
#[derive(Debug, Clone, Default)]
pub struct ControlSourceArbiter {
    state: ControlSourceState,
}

impl ControlSourceArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a device notification and activate its control path.
    ///
    /// Returns `true` when the authoritative source changed. Unknown devices
    /// are logged and ignored.
    pub fn on_device_changed(&mut self, device: &DeviceCapability) -> bool {
        let next = match device {
            DeviceCapability::Keyboard => ControlSourceState {
                keyboard_active: true,
                joystick_active: false,
            },
            DeviceCapability::Pointer | DeviceCapability::Touch | DeviceCapability::Gamepad => {
                ControlSourceState {
                    keyboard_active: false,
                    joystick_active: true,
                }
            }
            DeviceCapability::Unknown(tag) => {
                tracing::warn!("Ignoring device change from unclassified device {tag:?}");
                return false;
            }
        };
        let changed = next != self.state;
        self.state = next;
        if changed {
            tracing::info!(
                "Control source is now {:?} ({})",
                self.current_source(),
                device.tag()
            );
        }
        changed
    }

    pub fn current_source(&self) -> ControlSource {
        match (self.state.keyboard_active, self.state.joystick_active) {
            (true, _) => ControlSource::Keyboard,
            (false, true) => ControlSource::Joystick,
            (false, false) => ControlSource::None,
        }
    }

    pub fn state(&self) -> ControlSourceState {
        self.state
    }
}
