//! Quadcopter flight control: device arbitration, the per-frame flight
//! dynamics model, the battery model, and the session that ties them to a
//! physics body.
//!
//! Everything here runs synchronously inside one frame callback. The physics
//! engine is reached only through the [`FlightBody`] trait.

pub mod arbiter;
pub mod battery;
pub mod body;
pub mod dynamics;
mod error;
pub mod session;
pub mod telemetry;

pub use arbiter::{ControlSource, ControlSourceArbiter, ControlSourceState};
pub use battery::{BatteryState, ChargeEvent};
pub use body::FlightBody;
pub use dynamics::{FlightModel, FlightState, FrameForces, pitch_roll_from_orientation};
pub use error::FlightError;
pub use session::{FlightSession, FrameReport};
pub use telemetry::{TelemetrySampler, TelemetrySnapshot};
