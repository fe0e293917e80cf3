//! Cameras and the set that owns them.

use glam::{Mat4, Quat, Vec3};
use serde::Serialize;

/// A perspective camera that generates view and projection matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// A perspective camera with a vertical field of view in degrees.
    pub fn perspective(fov_deg: f32, aspect_ratio: f32) -> Self {
        Self {
            fov_y: fov_deg.clamp(1.0, 179.0).to_radians(),
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Place the camera at `position` looking toward `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        let forward = (target - position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        // Inverse of a right-handed look-at view is the camera rotation.
        let view = Mat4::look_to_rh(Vec3::ZERO, forward, Vec3::Y);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    /// Inverse of the camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation);
        let translation_matrix = Mat4::from_translation(self.position);
        (translation_matrix * rotation_matrix).inverse()
    }

    /// Projection matrix with reverse-Z: near maps to 1, far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// -Z in camera space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Update the aspect ratio. Zero-height viewports (minimized windows)
    /// are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.05,
            far: 500.0,
        }
    }
}

/// Opaque reference to a camera in a [`CameraSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CameraHandle(usize);

/// All cameras in the scene, addressed by [`CameraHandle`].
#[derive(Debug, Clone, Default)]
pub struct CameraSet {
    cameras: Vec<Camera>,
}

impl CameraSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, camera: Camera) -> CameraHandle {
        self.cameras.push(camera);
        CameraHandle(self.cameras.len() - 1)
    }

    pub fn get(&self, handle: CameraHandle) -> Option<&Camera> {
        self.cameras.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: CameraHandle) -> Option<&mut Camera> {
        self.cameras.get_mut(handle.0)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Propagate a surface resize to every camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        for camera in &mut self.cameras {
            camera.set_aspect_ratio(width as f32, height as f32);
        }
    }
}
