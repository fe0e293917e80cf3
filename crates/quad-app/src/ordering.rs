//! System sets and ordering constraints inside each frame stage.

use bevy_ecs::prelude::*;

use crate::schedule::{FrameSchedule, FrameStage};

/// Sets for systems in the Input stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputSet {
    /// Feed scripted or polled device activity into the input resources.
    Feed,
    /// Route device notifications to the arbiter.
    Devices,
    /// Turn key presses into commands and apply them.
    Commands,
}

/// Sets for systems in the Physics stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Step,
    /// Collision events to charge events.
    Events,
}

/// Sets for systems in the Sync stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncSet {
    Cameras,
}

/// Sets for systems in the Render stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderSet {
    Compose,
    Telemetry,
}

/// Install ordering constraints on every stage.
pub fn configure_ordering(schedule: &mut FrameSchedule) {
    schedule
        .schedule_mut(FrameStage::Input)
        .configure_sets((
            InputSet::Feed.before(InputSet::Devices),
            InputSet::Devices.before(InputSet::Commands),
        ));
    schedule
        .schedule_mut(FrameStage::Physics)
        .configure_sets(PhysicsSet::Step.before(PhysicsSet::Events));
    schedule
        .schedule_mut(FrameStage::Render)
        .configure_sets(RenderSet::Compose.before(RenderSet::Telemetry));
}
