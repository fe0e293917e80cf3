//! One flying drone: arbitration, input selection, and the flight model.

use crate::arbiter::{ControlSource, ControlSourceArbiter};
use crate::battery::{BatteryState, ChargeEvent};
use crate::body::FlightBody;
use crate::dynamics::{FlightModel, FlightState, FrameForces};
use crate::error::FlightError;
use quad_config::Config;
use quad_input::{ControlInputs, DeviceCapability, JoystickReader};

/// Summary of one [`FlightSession::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub source: ControlSource,
    /// The inputs the flight model actually consumed.
    pub inputs: ControlInputs,
    pub forces: FrameForces,
}

/// Owns all per-drone flight state.
///
/// Device notifications, charge events and commands may arrive at any point
/// between frames. [`step`](Self::step) then publishes the joystick buffer,
/// picks the authoritative inputs and runs the flight model once.
#[derive(Debug)]
pub struct FlightSession {
    arbiter: ControlSourceArbiter,
    model: FlightModel,
    flight: FlightState,
    battery: BatteryState,
    joystick: JoystickReader,
    frame: u64,
}

impl FlightSession {
    pub fn new(config: &Config, joystick: JoystickReader) -> Self {
        Self {
            arbiter: ControlSourceArbiter::new(),
            model: FlightModel::new(config.flight.clone(), &config.battery),
            flight: FlightState::new(config.flight.auto_balance),
            battery: BatteryState::new(config.battery.initial_percentage),
            joystick,
            frame: 0,
        }
    }

    pub fn on_device_changed(&mut self, device: &DeviceCapability) -> bool {
        self.arbiter.on_device_changed(device)
    }

    /// Docking notification from the physics binding.
    pub fn on_collision(&mut self, event: ChargeEvent) {
        self.battery.on_charge_event(event);
    }

    /// Flip auto-balance. Returns the new setting.
    pub fn toggle_auto_balance(&mut self) -> bool {
        self.flight.auto_balance = !self.flight.auto_balance;
        tracing::info!("Auto-balance {}", if self.flight.auto_balance { "on" } else { "off" });
        self.flight.auto_balance
    }

    /// Settle flight state and recenter the joystick. Battery is kept.
    pub fn reset(&mut self) {
        self.flight.settle();
        self.joystick.reset();
        tracing::info!("Flight state reset at frame {}", self.frame);
    }

    pub fn source(&self) -> ControlSource {
        self.arbiter.current_source()
    }

    pub fn flight(&self) -> &FlightState {
        &self.flight
    }

    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    pub fn battery_mut(&mut self) -> &mut BatteryState {
        &mut self.battery
    }

    pub fn model(&self) -> &FlightModel {
        &self.model
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame.
    ///
    /// `keyboard` is this frame's keyboard-derived input; it is used only
    /// while the keyboard is the active source. With no source at all the
    /// drone sees neutral input. Fails if `body` is absent.
    pub fn step(
        &mut self,
        keyboard: &ControlInputs,
        dt: f32,
        body: Option<&mut dyn FlightBody>,
    ) -> Result<FrameReport, FlightError> {
        self.joystick.swap();
        let Some(body) = body else {
            return Err(FlightError::MissingBody { frame: self.frame });
        };

        let source = self.arbiter.current_source();
        let inputs = match source {
            ControlSource::Keyboard => *keyboard,
            ControlSource::Joystick => *self.joystick.front(),
            ControlSource::None => ControlInputs::NEUTRAL,
        };

        let was_empty = self.battery.is_empty();
        let forces = self
            .model
            .update(&inputs, dt, &mut self.flight, &mut self.battery, body);
        if !was_empty && self.battery.is_empty() {
            tracing::warn!("Battery depleted at frame {}", self.frame);
        }

        let report = FrameReport {
            frame: self.frame,
            source,
            inputs,
            forces,
        };
        self.frame += 1;
        Ok(report)
    }
}
