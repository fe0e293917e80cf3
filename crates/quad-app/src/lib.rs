//! Frame scheduling, scripted flights, and the headless playground that ties
//! the flight, physics and render crates together.

pub mod app;
pub mod ordering;
pub mod resources;
pub mod schedule;
pub mod script;
pub mod systems;

pub use app::{AppError, Playground, RunSummary};
pub use ordering::{InputSet, PhysicsSet, RenderSet, SyncSet, configure_ordering};
pub use schedule::{FrameSchedule, FrameStage};
pub use script::{FlightScript, ScriptAction, ScriptError, ScriptPlayer, ScriptStep, TouchKind};
