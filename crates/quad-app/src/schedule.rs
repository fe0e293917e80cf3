//! Frame stage labels and the ordered schedule runner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{IntoSystemConfigs, ScheduleLabel};

/// Maximum number of fixed steps per frame to prevent spiral-of-death.
const MAX_FIXED_STEPS_PER_FRAME: u32 = 10;

/// Labels for each per-frame stage.
///
/// `Input` runs once per frame, then `Flight` and `Physics` run together zero
/// or more times at the fixed timestep, then `Sync` and `Render` run once.
#[derive(ScheduleLabel, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStage {
    /// Device notifications, scripted input, keyboard commands.
    Input,
    /// Flight session step: arbitration, dynamics, battery.
    Flight,
    /// Physics integration and collision routing.
    Physics,
    /// Camera rigs follow the integrated body.
    Sync,
    /// Frame composition and telemetry.
    Render,
}

impl FrameStage {
    pub const ALL: [FrameStage; 5] = [
        FrameStage::Input,
        FrameStage::Flight,
        FrameStage::Physics,
        FrameStage::Sync,
        FrameStage::Render,
    ];

    fn index(self) -> usize {
        match self {
            FrameStage::Input => 0,
            FrameStage::Flight => 1,
            FrameStage::Physics => 2,
            FrameStage::Sync => 3,
            FrameStage::Render => 4,
        }
    }
}

/// Ordered collection of [`Schedule`]s that drives one frame.
pub struct FrameSchedule {
    schedules: [Schedule; 5],
    fixed_accumulator: f64,
    fixed_dt: f64,
}

impl FrameSchedule {
    pub fn new(fixed_dt: f64) -> Self {
        Self {
            schedules: FrameStage::ALL.map(Schedule::new),
            fixed_accumulator: 0.0,
            fixed_dt: fixed_dt.max(1e-4),
        }
    }

    /// Register a system (or system tuple) into a stage.
    pub fn add_system<M>(&mut self, stage: FrameStage, system: impl IntoSystemConfigs<M>) {
        self.schedules[stage.index()].add_systems(system);
    }

    pub fn schedule_mut(&mut self, stage: FrameStage) -> &mut Schedule {
        &mut self.schedules[stage.index()]
    }

    /// Run every stage for one frame of `frame_dt` seconds. Returns how many
    /// fixed steps ran.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) -> u32 {
        self.run_stage(FrameStage::Input, world);

        self.fixed_accumulator += frame_dt.max(0.0);
        let mut steps: u32 = 0;
        while self.fixed_accumulator >= self.fixed_dt && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.run_stage(FrameStage::Flight, world);
            self.run_stage(FrameStage::Physics, world);
            self.fixed_accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == MAX_FIXED_STEPS_PER_FRAME && self.fixed_accumulator >= self.fixed_dt {
            tracing::warn!(
                "Frame fell {:.3}s behind; dropping backlog",
                self.fixed_accumulator
            );
            self.fixed_accumulator = 0.0;
        }

        self.run_stage(FrameStage::Sync, world);
        self.run_stage(FrameStage::Render, world);
        steps
    }

    pub fn fixed_accumulator(&self) -> f64 {
        self.fixed_accumulator
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Force-initialize all schedules, validating the dependency graphs.
    pub fn initialize_all(&mut self, world: &mut World) {
        for schedule in &mut self.schedules {
            if let Err(err) = schedule.initialize(world) {
                tracing::error!("Schedule {:?} failed to build: {err}", schedule.label());
            }
        }
    }

    fn run_stage(&mut self, stage: FrameStage, world: &mut World) {
        self.schedules[stage.index()].run(world);
    }
}

impl Default for FrameSchedule {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
