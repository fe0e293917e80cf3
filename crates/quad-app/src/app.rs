//! The headless playground: one drone, a ground slab, charging stations and
//! two cameras, driven frame by frame through the [`FrameSchedule`].

use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use glam::{Quat, Vec2, Vec3};
use quad_config::{Config, ConfigError};
use quad_flight::{ControlSource, FlightError, FlightSession, TelemetrySampler, TelemetrySnapshot};
use quad_input::{
    DeviceCapability, FlightCommand, GamepadManager, JoystickWriter, PadOutput, Stick,
    VirtualJoystick, joystick_channel,
};
use quad_physics::{
    DroneHandles, DroneSpec, PhysicsWorld, physics_step_system, spawn_drone, spawn_ground,
    spawn_station,
};
use quad_render::{
    Camera, CameraSet, FramePlan, PipCameraState, PipLayout, PipRig, Viewport, compose_frame,
};
use serde::Serialize;
use tracing::info;

use crate::ordering::{InputSet, PhysicsSet, RenderSet, SyncSet, configure_ordering};
use crate::resources::{
    FlightFault, FlightSessionRes, FlightStats, FrameClock, JoystickFeed, LastReport, PilotInput,
    SceneView, SpawnPoint, TelemetryLog,
};
use crate::schedule::{FrameSchedule, FrameStage};
use crate::script::{FlightScript, ScriptError, ScriptPlayer};
use crate::systems::{
    camera_sync_system, charge_system, command_system, compose_system, device_system,
    flight_step_system, script_feed_system, telemetry_system,
};

const MAIN_FOV_DEG: f32 = 60.0;
const CHASE_OFFSET: Vec3 = Vec3::new(0.0, 1.5, 4.0);

/// Fatal playground errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Flight(#[from] FlightError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// End-of-run report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub source: ControlSource,
    pub battery_pct: f32,
    pub max_altitude: f32,
    pub final_position: Vec3,
    pub docks: u32,
    pub undocks: u32,
    pub telemetry_samples: usize,
}

pub struct Playground {
    world: World,
    schedule: FrameSchedule,
    gamepads: Option<GamepadManager>,
    frame_dt: f64,
}

impl Playground {
    pub fn new(config: &Config) -> Self {
        let mut world = World::new();

        let mut physics = PhysicsWorld::new(config.sim.fixed_dt);
        spawn_ground(&mut physics);
        for station in &config.sim.stations {
            spawn_station(&mut physics, Vec3::from_array(*station));
        }
        let spawn = Vec3::from_array(config.sim.spawn);
        let drone = spawn_drone(
            &mut physics,
            &DroneSpec::with_resting_height(config.flight.resting_height),
            spawn,
        );

        let viewport = Viewport::new(config.window.width, config.window.height);
        let aspect = viewport.aspect_ratio();
        let mut cameras = CameraSet::new();
        let main = cameras.add(Camera::perspective(MAIN_FOV_DEG, aspect));
        // The onboard camera exists from the moment the drone does.
        let mut pip = PipCameraState::new(config.pip.active);
        pip.attach(cameras.add(Camera::perspective(config.pip.fov_deg, aspect)));
        let layout = PipLayout::from_config(&config.pip);
        let plan = compose_frame(&pip, main, viewport, &layout);

        let (writer, reader) = joystick_channel();
        let session = FlightSession::new(config, reader);

        let mut pilot = PilotInput::default();
        pilot.keymap.apply_overrides(&config.input.keybindings);

        let (w, h) = (viewport.width as f32, viewport.height as f32);
        let deadzone = config.input.joystick_deadzone;
        let touch_sticks = vec![
            VirtualJoystick::new(Stick::ThrustYaw, Vec2::new(w * 0.15, h * 0.75), h * 0.12, deadzone),
            VirtualJoystick::new(Stick::PitchRoll, Vec2::new(w * 0.85, h * 0.75), h * 0.12, deadzone),
        ];

        world.insert_resource(physics);
        world.insert_resource(drone);
        world.insert_resource(SpawnPoint(spawn));
        world.insert_resource(FlightSessionRes(session));
        world.insert_resource(pilot);
        world.insert_resource(JoystickFeed {
            writer,
            touch_sticks,
        });
        world.insert_resource(SceneView {
            cameras,
            main,
            pip,
            rig: PipRig::from_config(&config.pip),
            layout,
            viewport,
            chase_offset: CHASE_OFFSET,
            plan,
        });
        world.insert_resource(FrameClock {
            frame: 0,
            dt: config.sim.fixed_dt,
        });
        world.insert_resource(TelemetryLog::new(
            TelemetrySampler::from_millis(config.sim.telemetry_interval_ms),
            true,
        ));
        world.init_resource::<FlightFault>();
        world.init_resource::<LastReport>();
        world.init_resource::<FlightStats>();

        let mut schedule = FrameSchedule::new(f64::from(config.sim.fixed_dt));
        configure_ordering(&mut schedule);
        schedule.add_system(
            FrameStage::Input,
            (
                script_feed_system.in_set(InputSet::Feed),
                device_system.in_set(InputSet::Devices),
                command_system.in_set(InputSet::Commands),
            ),
        );
        schedule.add_system(FrameStage::Flight, flight_step_system);
        schedule.add_system(
            FrameStage::Physics,
            (
                physics_step_system.in_set(PhysicsSet::Step),
                charge_system.in_set(PhysicsSet::Events),
            ),
        );
        schedule.add_system(FrameStage::Sync, camera_sync_system.in_set(SyncSet::Cameras));
        schedule.add_system(
            FrameStage::Render,
            (
                compose_system.in_set(RenderSet::Compose),
                telemetry_system.in_set(RenderSet::Telemetry),
            ),
        );
        schedule.initialize_all(&mut world);

        info!(
            "Playground ready: drone at {spawn:?}, {} station(s)",
            config.sim.stations.len()
        );
        Self {
            world,
            schedule,
            gamepads: None,
            frame_dt: f64::from(config.sim.fixed_dt),
        }
    }

    pub fn with_script(mut self, script: FlightScript) -> Self {
        info!("Running flight script {:?} ({} steps)", script.name, script.steps.len());
        self.world.insert_resource(ScriptPlayer::new(script));
        self
    }

    pub fn attach_gamepads(&mut self, gamepads: GamepadManager) {
        self.gamepads = Some(gamepads);
    }

    pub fn set_telemetry_echo(&mut self, echo: bool) {
        self.world.resource_mut::<TelemetryLog>().echo = echo;
    }

    /// Another producer for the joystick buffer.
    pub fn joystick_writer(&self) -> JoystickWriter {
        self.world.resource::<JoystickFeed>().writer.clone()
    }

    pub fn notify_device(&mut self, device: DeviceCapability) {
        self.world.resource_mut::<PilotInput>().devices.push(device);
    }

    pub fn queue_command(&mut self, command: FlightCommand) {
        self.world.resource_mut::<PilotInput>().commands.push(command);
    }

    /// Surface resize from the host window. Cameras and the overlay layout
    /// follow on the next composed frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut view = self.world.resource_mut::<SceneView>();
        view.cameras.resize(width, height);
        if height > 0 {
            view.viewport = Viewport::new(width, height);
        }
    }

    pub fn pilot_mut(&mut self) -> Mut<'_, PilotInput> {
        self.world.resource_mut::<PilotInput>()
    }

    /// Route gamepad output into this frame's input.
    pub fn feed_pad_outputs(&mut self, outputs: Vec<PadOutput>) {
        if outputs.is_empty() {
            return;
        }
        let writer = self.joystick_writer();
        let mut pilot = self.world.resource_mut::<PilotInput>();
        for output in outputs {
            match output {
                PadOutput::Device(device) => pilot.devices.push(device),
                PadOutput::Sample(sample) => {
                    writer.write(sample);
                }
                PadOutput::Command(command) => pilot.commands.push(command),
            }
        }
    }

    /// Run one frame. A flight fault ends the run.
    pub fn run_frame(&mut self) -> Result<(), AppError> {
        if let Some(gamepads) = self.gamepads.as_mut() {
            let outputs = gamepads.poll();
            self.feed_pad_outputs(outputs);
        }

        self.schedule.run(&mut self.world, self.frame_dt);

        self.world
            .resource_mut::<PilotInput>()
            .keyboard
            .clear_transients();
        self.world.resource_mut::<FrameClock>().frame += 1;

        match self.world.resource_mut::<FlightFault>().0.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn run(&mut self, frames: u32) -> Result<RunSummary, AppError> {
        for _ in 0..frames {
            self.run_frame()?;
        }
        let summary = self.summary();
        info!(
            "Run finished after {} frames: battery {:.1}%, peak altitude {:.2} m",
            summary.frames, summary.battery_pct, summary.max_altitude
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let session = self.session();
        let stats = self.world.resource::<FlightStats>();
        RunSummary {
            frames: self.world.resource::<FrameClock>().frame,
            source: session.source(),
            battery_pct: session.battery().percentage(),
            max_altitude: stats.max_altitude,
            final_position: self.drone_pose().map_or(Vec3::ZERO, |(p, _)| p),
            docks: stats.docks,
            undocks: stats.undocks,
            telemetry_samples: self.world.resource::<TelemetryLog>().total,
        }
    }

    pub fn session(&self) -> &FlightSession {
        &self.world.resource::<FlightSessionRes>().0
    }

    pub fn session_mut(&mut self) -> &mut FlightSession {
        &mut self.world.resource_mut::<FlightSessionRes>().into_inner().0
    }

    pub fn drone_pose(&self) -> Option<(Vec3, Quat)> {
        let handles = self.world.get_resource::<DroneHandles>()?;
        self.world.resource::<PhysicsWorld>().drone_pose(handles)
    }

    /// Drop the drone body from the world, as if it were never built.
    pub fn remove_drone(&mut self) {
        self.world.remove_resource::<DroneHandles>();
    }

    pub fn frame_plan(&self) -> &FramePlan {
        &self.world.resource::<SceneView>().plan
    }

    pub fn scene(&self) -> &SceneView {
        self.world.resource::<SceneView>()
    }

    /// Recent telemetry, oldest first.
    pub fn telemetry(&self) -> &VecDeque<TelemetrySnapshot> {
        &self.world.resource::<TelemetryLog>().snapshots
    }

    pub fn stats(&self) -> FlightStats {
        *self.world.resource::<FlightStats>()
    }

    pub fn last_report(&self) -> Option<quad_flight::FrameReport> {
        self.world.resource::<LastReport>().0
    }
}
