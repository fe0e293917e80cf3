//! The onboard picture-in-picture camera.
//!
//! The PiP camera is rigidly mounted on the drone: every frame its world
//! transform is the body transform composed with a fixed local offset and
//! tilt.

use crate::camera::{CameraHandle, CameraSet};
use glam::{Quat, Vec3};
use quad_config::PipConfig;

/// Whether the onboard view is shown and which camera renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipCameraState {
    camera: Option<CameraHandle>,
    active: bool,
}

impl PipCameraState {
    pub fn new(active: bool) -> Self {
        Self {
            camera: None,
            active,
        }
    }

    pub fn attach(&mut self, camera: CameraHandle) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<CameraHandle> {
        self.camera
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Flip visibility. Returns the new setting.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        log::info!("Onboard camera {}", if self.active { "shown" } else { "hidden" });
        self.active
    }

    /// Active with a camera to render from.
    pub fn should_render(&self) -> bool {
        self.active && self.camera.is_some()
    }
}

/// Mounting of the onboard camera in the drone's body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipRig {
    pub offset: Vec3,
    pub rotation: Quat,
}

impl PipRig {
    /// Mount from config; a positive tilt points the camera down.
    pub fn from_config(config: &PipConfig) -> Self {
        Self {
            offset: Vec3::from_array(config.offset),
            rotation: Quat::from_rotation_x(-config.tilt_deg.to_radians()),
        }
    }

    /// Camera world position and rotation for a body at `body_position`
    /// with `body_rotation`.
    pub fn world_transform(&self, body_position: Vec3, body_rotation: Quat) -> (Vec3, Quat) {
        (
            body_position + body_rotation * self.offset,
            (body_rotation * self.rotation).normalize(),
        )
    }
}

impl Default for PipRig {
    fn default() -> Self {
        Self::from_config(&PipConfig::default())
    }
}

/// Move the attached PiP camera to follow the body. Returns `false` when no
/// camera is attached or the handle is stale.
pub fn sync_pip_camera(
    cameras: &mut CameraSet,
    state: &PipCameraState,
    rig: &PipRig,
    body_position: Vec3,
    body_rotation: Quat,
) -> bool {
    let Some(camera) = state.camera().and_then(|h| cameras.get_mut(h)) else {
        return false;
    };
    let (position, rotation) = rig.world_transform(body_position, body_rotation);
    camera.position = position;
    camera.rotation = rotation;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_toggle_and_render_gate() {
        let mut state = PipCameraState::new(true);
        assert!(!state.should_render());
        let mut cameras = CameraSet::new();
        state.attach(cameras.add(Camera::default()));
        assert!(state.should_render());
        assert!(!state.toggle());
        assert!(!state.should_render());
        state.set_active(true);
        assert!(state.is_active());
    }

    #[test]
    fn test_rig_follows_body_rotation() {
        let rig = PipRig {
            offset: Vec3::new(0.0, 0.0, -1.0),
            rotation: Quat::IDENTITY,
        };
        let yaw = Quat::from_rotation_y(FRAC_PI_2);
        let (position, rotation) = rig.world_transform(Vec3::new(1.0, 2.0, 3.0), yaw);
        // Body-forward -Z turns into world -X after a quarter yaw.
        assert!(position.abs_diff_eq(Vec3::new(0.0, 2.0, 3.0), 1e-5));
        assert!(rotation.abs_diff_eq(yaw, 1e-5));
    }

    #[test]
    fn test_sync_moves_attached_camera() {
        let mut cameras = CameraSet::new();
        let handle = cameras.add(Camera::default());
        let mut state = PipCameraState::new(false);
        let rig = PipRig::default();

        assert!(!sync_pip_camera(&mut cameras, &state, &rig, Vec3::ONE, Quat::IDENTITY));
        state.attach(handle);
        assert!(sync_pip_camera(&mut cameras, &state, &rig, Vec3::ONE, Quat::IDENTITY));

        let camera = cameras.get(handle).unwrap();
        assert!(camera.position.abs_diff_eq(Vec3::ONE + rig.offset, 1e-6));
        assert!(camera.rotation.abs_diff_eq(rig.rotation, 1e-6));
    }

    #[test]
    fn test_default_tilt_looks_down() {
        let rig = PipRig::default();
        let forward = rig.rotation * Vec3::NEG_Z;
        assert!(forward.y < 0.0);
    }
}
