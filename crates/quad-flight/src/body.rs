//! The seam between the flight model and the physics engine.

use glam::{Quat, Vec3};

/// A dynamic rigid body the flight model can read and push.
///
/// Forces and torques are accumulators owned by the physics engine; the
/// flight model clears them with [`reset_forces`](Self::reset_forces) at the
/// start of every frame and rebuilds them from scratch.
pub trait FlightBody {
    /// Center of the body in world space.
    fn world_position(&self) -> Vec3;
    fn orientation(&self) -> Quat;
    /// World-space angular velocity (rad/s).
    fn angular_velocity(&self) -> Vec3;

    fn reset_forces(&mut self);
    /// Apply `force` given in the body frame at `local_point` (body frame).
    fn apply_local_force(&mut self, force: Vec3, local_point: Vec3);
    /// Apply a world-space torque.
    fn apply_torque(&mut self, torque: Vec3);
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
}

/// In-memory body that records what the flight model asked for.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub angvel: Vec3,
    pub force: Vec3,
    pub force_point: Vec3,
    pub torque: Vec3,
    pub resets: u32,
}

#[cfg(test)]
impl RecordingBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl FlightBody for RecordingBody {
    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn orientation(&self) -> Quat {
        self.rotation
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angvel
    }

    fn reset_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
        self.resets += 1;
    }

    fn apply_local_force(&mut self, force: Vec3, local_point: Vec3) {
        self.force += force;
        self.force_point = local_point;
    }

    fn apply_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angvel = angular_velocity;
    }
}
