//! Input abstraction: keyboard, gamepad, and touch sticks normalized into
//! per-frame [`ControlInputs`] plus discrete [`FlightCommand`]s.

pub mod controls;
pub mod device;
pub mod gamepad;
pub mod joystick;
pub mod keyboard;
pub mod keymap;

pub use controls::{ControlInputs, FlightCommand, Stick, StickSample, apply_radial_deadzone};
pub use device::DeviceCapability;
pub use gamepad::{GamepadManager, PadAxis, PadButton, PadEvent, PadOutput, PadTranslator};
pub use joystick::{JoystickReader, JoystickWriter, VirtualJoystick, joystick_channel};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use keymap::{FlightAction, FlightKeymap, key_from_name};
