//! Frame systems, one per stage concern.

use bevy_ecs::prelude::*;
use glam::Vec2;
use quad_flight::{ControlSource, FlightBody};
use quad_input::{DeviceCapability, FlightCommand, StickSample, key_from_name};
use quad_physics::{DroneHandles, PhysicsWorld};
use quad_render::{compose_frame, sync_pip_camera};
use tracing::{debug, error, info, warn};
use winit::event::TouchPhase;

use crate::resources::{
    FlightFault, FlightSessionRes, FlightStats, FrameClock, JoystickFeed, LastReport, PilotInput,
    SceneView, SpawnPoint, TelemetryLog,
};
use crate::script::{ScriptAction, ScriptPlayer, TouchKind};

impl From<TouchKind> for TouchPhase {
    fn from(kind: TouchKind) -> Self {
        match kind {
            TouchKind::Start => TouchPhase::Started,
            TouchKind::Move => TouchPhase::Moved,
            TouchKind::End => TouchPhase::Ended,
        }
    }
}

/// Replay the script actions due this frame into the input resources.
pub fn script_feed_system(
    script: Option<ResMut<ScriptPlayer>>,
    clock: Res<FrameClock>,
    mut pilot: ResMut<PilotInput>,
    mut feed: ResMut<JoystickFeed>,
) {
    let Some(mut script) = script else {
        return;
    };
    for action in script.due(clock.frame) {
        match action {
            ScriptAction::Device(tag) => pilot.devices.push(DeviceCapability::from_tag(&tag)),
            ScriptAction::Press(name) => {
                if let Some(key) = key_from_name(&name) {
                    pilot.keyboard.press(key);
                }
            }
            ScriptAction::Release(name) => {
                if let Some(key) = key_from_name(&name) {
                    pilot.keyboard.release(key);
                }
            }
            ScriptAction::Stick { stick, x, y } => {
                feed.writer.write(StickSample::held(stick, Vec2::new(x, y)));
            }
            ScriptAction::ReleaseStick(stick) => {
                feed.writer.write(StickSample::released(stick));
            }
            ScriptAction::Touch { id, phase, x, y } => {
                let JoystickFeed {
                    writer,
                    touch_sticks,
                } = &mut *feed;
                let position = Vec2::new(x, y);
                let sample = touch_sticks
                    .iter_mut()
                    .find_map(|stick| stick.on_touch(id, phase.into(), position));
                if let Some(sample) = sample {
                    // Grabbing an on-screen stick makes touch the active device.
                    if phase == TouchKind::Start {
                        pilot.devices.push(DeviceCapability::Touch);
                    }
                    writer.write(sample);
                }
            }
            ScriptAction::Command(command) => pilot.commands.push(command),
            ScriptAction::Note(note) => info!("Script {} frame {}: {note}", script.name(), clock.frame),
        }
    }
}

/// Route pending device notifications to the arbiter.
///
/// A fresh key press counts as a keyboard notification, so the keyboard can
/// take control back from a stick.
pub fn device_system(mut pilot: ResMut<PilotInput>, mut session: ResMut<FlightSessionRes>) {
    for device in pilot.devices.drain(..) {
        session.0.on_device_changed(&device);
    }
    if pilot.keyboard.any_just_pressed() && session.0.source() != ControlSource::Keyboard {
        session.0.on_device_changed(&DeviceCapability::Keyboard);
    }
}

/// Apply keyboard and queued commands.
pub fn command_system(
    mut pilot: ResMut<PilotInput>,
    mut session: ResMut<FlightSessionRes>,
    mut view: ResMut<SceneView>,
    mut physics: ResMut<PhysicsWorld>,
    drone: Option<Res<DroneHandles>>,
    spawn: Res<SpawnPoint>,
) {
    let PilotInput {
        keyboard,
        keymap,
        commands,
        ..
    } = &mut *pilot;
    let mut pending = std::mem::take(commands);
    pending.extend(keymap.commands(keyboard));

    for command in pending {
        match command {
            FlightCommand::ToggleAutoBalance => {
                session.0.toggle_auto_balance();
            }
            FlightCommand::TogglePip => {
                view.pip.toggle();
            }
            FlightCommand::Reset => {
                let moved = drone
                    .as_deref()
                    .is_some_and(|handles| physics.teleport_drone(handles, spawn.0));
                if !moved {
                    warn!("Reset requested with no drone body");
                }
                session.0.reset();
                info!("Drone reset to {:?}", spawn.0);
            }
        }
    }
}

/// One flight session step against the drone body.
pub fn flight_step_system(
    mut session: ResMut<FlightSessionRes>,
    pilot: Res<PilotInput>,
    mut physics: ResMut<PhysicsWorld>,
    drone: Option<Res<DroneHandles>>,
    clock: Res<FrameClock>,
    mut fault: ResMut<FlightFault>,
    mut last: ResMut<LastReport>,
    mut stats: ResMut<FlightStats>,
) {
    if fault.0.is_some() {
        return;
    }
    let keyboard = pilot.keymap.control_inputs(&pilot.keyboard);
    let mut body = match drone.as_deref() {
        Some(handles) => physics.drone_body(handles),
        None => None,
    };
    let result = session.0.step(
        &keyboard,
        clock.dt,
        body.as_mut().map(|b| b as &mut dyn FlightBody),
    );
    match result {
        Ok(report) => {
            last.0 = Some(report);
            stats.max_altitude = stats.max_altitude.max(session.0.flight().altitude);
        }
        Err(err) => {
            error!("Flight step failed: {err}");
            fault.0 = Some(err);
        }
    }
}

/// Turn station overlaps into battery charge events.
pub fn charge_system(
    mut physics: ResMut<PhysicsWorld>,
    mut session: ResMut<FlightSessionRes>,
    mut stats: ResMut<FlightStats>,
) {
    for event in physics.drain_charge_events() {
        match event {
            quad_flight::ChargeEvent::Begin => stats.docks += 1,
            quad_flight::ChargeEvent::End => stats.undocks += 1,
        }
        session.0.on_collision(event);
    }
}

/// Keep the onboard and chase cameras on the drone.
pub fn camera_sync_system(
    mut view: ResMut<SceneView>,
    physics: Res<PhysicsWorld>,
    drone: Option<Res<DroneHandles>>,
) {
    let Some((position, rotation)) = drone
        .as_deref()
        .and_then(|handles| physics.drone_pose(handles))
    else {
        return;
    };
    let SceneView {
        cameras,
        main,
        pip,
        rig,
        chase_offset,
        ..
    } = &mut *view;
    sync_pip_camera(cameras, pip, rig, position, rotation);
    if let Some(camera) = cameras.get_mut(*main) {
        camera.look_at(position + *chase_offset, position);
    }
}

pub fn compose_system(mut view: ResMut<SceneView>) {
    let plan = compose_frame(&view.pip, view.main, view.viewport, &view.layout);
    view.plan = plan;
}

/// Sample telemetry on its interval and echo it as JSON.
pub fn telemetry_system(
    mut telemetry: ResMut<TelemetryLog>,
    session: Res<FlightSessionRes>,
    clock: Res<FrameClock>,
) {
    let Some(snapshot) = telemetry.sampler.tick(clock.dt, &session.0) else {
        return;
    };
    if telemetry.echo {
        match serde_json::to_string(&snapshot) {
            Ok(line) => info!(target: "telemetry", "{line}"),
            Err(err) => debug!("Telemetry encode failed: {err}"),
        }
    }
    telemetry.record(snapshot);
}
