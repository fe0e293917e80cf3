//! Device capability tags carried by device-change notifications.

use serde::{Deserialize, Serialize};

/// What kind of device just connected or became the user's focus.
///
/// The input layer reports a tag; deciding which control path becomes
/// authoritative is the arbiter's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCapability {
    Keyboard,
    /// Mouse or pen driving an on-screen stick.
    Pointer,
    Touch,
    Gamepad,
    /// Anything the input layer could not classify.
    Unknown(String),
}

impl DeviceCapability {
    /// Classify a free-form device tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "keyboard" => Self::Keyboard,
            "pointer" | "mouse" | "pen" => Self::Pointer,
            "touch" => Self::Touch,
            "gamepad" | "joystick" => Self::Gamepad,
            _ => Self::Unknown(tag.to_string()),
        }
    }

    /// Canonical tag for logging.
    pub fn tag(&self) -> &str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Pointer => "pointer",
            Self::Touch => "touch",
            Self::Gamepad => "gamepad",
            Self::Unknown(tag) => tag,
        }
    }
}
