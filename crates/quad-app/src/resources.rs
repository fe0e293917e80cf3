//! ECS resources shared by the frame systems.

use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use glam::Vec3;
use quad_flight::{FlightError, FlightSession, FrameReport, TelemetrySampler, TelemetrySnapshot};
use quad_input::{
    DeviceCapability, FlightCommand, FlightKeymap, JoystickWriter, KeyboardState, VirtualJoystick,
};
use quad_render::{CameraHandle, CameraSet, FramePlan, PipCameraState, PipLayout, PipRig, Viewport};

/// The drone's flight session.
#[derive(Resource)]
pub struct FlightSessionRes(pub FlightSession);

/// Keyboard state plus device and command events waiting for this frame.
#[derive(Resource, Default)]
pub struct PilotInput {
    pub keyboard: KeyboardState,
    pub keymap: FlightKeymap,
    pub devices: Vec<DeviceCapability>,
    pub commands: Vec<FlightCommand>,
}

/// Write side of the joystick double buffer and the on-screen sticks.
#[derive(Resource)]
pub struct JoystickFeed {
    pub writer: JoystickWriter,
    pub touch_sticks: Vec<VirtualJoystick>,
}

/// Cameras, the onboard view, and the last composed frame.
#[derive(Resource)]
pub struct SceneView {
    pub cameras: CameraSet,
    pub main: CameraHandle,
    pub pip: PipCameraState,
    pub rig: PipRig,
    pub layout: PipLayout,
    pub viewport: Viewport,
    /// Main camera position relative to the drone.
    pub chase_offset: Vec3,
    pub plan: FramePlan,
}

/// Frame counter and fixed step.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FrameClock {
    pub frame: u64,
    pub dt: f32,
}

/// Where a reset puts the drone back.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnPoint(pub Vec3);

/// First fatal flight error. Once set, the flight stage stops stepping.
#[derive(Resource, Debug, Default)]
pub struct FlightFault(pub Option<FlightError>);

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LastReport(pub Option<FrameReport>);

/// Most recent snapshots kept in memory.
pub const TELEMETRY_HISTORY: usize = 1024;

/// Sampled telemetry, optionally echoed to the log as JSON lines.
#[derive(Resource)]
pub struct TelemetryLog {
    pub sampler: TelemetrySampler,
    /// The last [`TELEMETRY_HISTORY`] snapshots, oldest first.
    pub snapshots: VecDeque<TelemetrySnapshot>,
    /// Snapshots taken over the whole run.
    pub total: usize,
    pub echo: bool,
}

impl TelemetryLog {
    pub fn new(sampler: TelemetrySampler, echo: bool) -> Self {
        Self {
            sampler,
            snapshots: VecDeque::with_capacity(TELEMETRY_HISTORY),
            total: 0,
            echo,
        }
    }

    pub fn record(&mut self, snapshot: TelemetrySnapshot) {
        if self.snapshots.len() == TELEMETRY_HISTORY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
        self.total += 1;
    }
}

/// Running totals for the end-of-run summary.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FlightStats {
    pub max_altitude: f32,
    pub docks: u32,
    pub undocks: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quad_config::Config;
    use quad_input::joystick_channel;

    #[test]
    fn test_telemetry_history_is_bounded() {
        let (_writer, reader) = joystick_channel();
        let session = FlightSession::new(&Config::default(), reader);
        let mut log = TelemetryLog::new(TelemetrySampler::from_millis(100), false);
        for i in 0..TELEMETRY_HISTORY + 10 {
            log.record(TelemetrySnapshot::capture(&session, i as f64));
        }
        assert_eq!(log.snapshots.len(), TELEMETRY_HISTORY);
        assert_eq!(log.total, TELEMETRY_HISTORY + 10);
        assert_eq!(log.snapshots.front().map(|s| s.time_s), Some(10.0));
    }
}
