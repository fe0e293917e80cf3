//! Camera math, the picture-in-picture onboard camera, and per-frame render
//! composition.
//!
//! This crate produces [`FramePlan`]s describing what to draw and where; it
//! owns no GPU state.

pub mod camera;
pub mod compositor;
pub mod pip;

pub use camera::{Camera, CameraHandle, CameraSet};
pub use compositor::{FramePlan, PipLayout, RenderPass, RenderTarget, ScreenRect, Viewport, compose_frame};
pub use pip::{PipCameraState, PipRig, sync_pip_camera};
