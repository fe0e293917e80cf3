//! The drone rigid body and its [`FlightBody`] binding.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use quad_flight::FlightBody;
use rapier3d::prelude::*;

use crate::scene::BodyTag;
use crate::{PhysicsWorld, from_rapier, to_rapier};

/// Physical build of the airframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneSpec {
    /// Half extents of the box collider (meters).
    pub half_extents: Vec3,
    /// Total mass (kg).
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl DroneSpec {
    /// An airframe whose resting height matches `resting_height`.
    pub fn with_resting_height(resting_height: f32) -> Self {
        Self {
            half_extents: Vec3::new(0.25, resting_height / 2.0, 0.25),
            ..Self::default()
        }
    }
}

impl Default for DroneSpec {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.25, 0.1, 0.25),
            mass: 1.0,
            linear_damping: 0.3,
            angular_damping: 2.0,
        }
    }
}

/// Handles to the spawned drone.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroneHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Spawns the dynamic drone body at `position`.
pub fn spawn_drone(physics: &mut PhysicsWorld, spec: &DroneSpec, position: Vec3) -> DroneHandles {
    let body = RigidBodyBuilder::dynamic()
        .translation(to_rapier(position))
        .linear_damping(spec.linear_damping)
        .angular_damping(spec.angular_damping)
        .can_sleep(false)
        .build();
    let body_handle = physics.rigid_body_set.insert(body);

    let half = spec.half_extents;
    let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
        .mass(spec.mass)
        .friction(0.6)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .user_data(BodyTag::Drone.to_user_data())
        .build();
    let collider_handle =
        physics
            .collider_set
            .insert_with_parent(collider, body_handle, &mut physics.rigid_body_set);

    tracing::info!(
        "Spawned {} at ({:.2}, {:.2}, {:.2})",
        BodyTag::Drone.name(),
        position.x,
        position.y,
        position.z
    );
    DroneHandles {
        body: body_handle,
        collider: collider_handle,
    }
}

impl PhysicsWorld {
    /// Borrow the drone as a [`FlightBody`]. `None` if the body was removed.
    pub fn drone_body(&mut self, handles: &DroneHandles) -> Option<DroneBody<'_>> {
        self.rigid_body_set
            .get_mut(handles.body)
            .map(|body| DroneBody { body })
    }

    /// Read-only position and orientation of the drone.
    pub fn drone_pose(&self, handles: &DroneHandles) -> Option<(Vec3, Quat)> {
        self.rigid_body_set.get(handles.body).map(|body| {
            let r = body.rotation();
            (
                from_rapier(&body.translation()),
                Quat::from_xyzw(r.x, r.y, r.z, r.w),
            )
        })
    }

    /// Move the drone to `position`, level and at rest.
    pub fn teleport_drone(&mut self, handles: &DroneHandles, position: Vec3) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handles.body) else {
            return false;
        };
        body.set_translation(to_rapier(position), true);
        body.set_rotation(Rotation::IDENTITY, true);
        body.set_linvel(Vector::ZERO, true);
        body.set_angvel(Vector::ZERO, true);
        body.reset_forces(true);
        body.reset_torques(true);
        true
    }
}

/// A mutable view of the drone body for one frame.
pub struct DroneBody<'a> {
    body: &'a mut RigidBody,
}

impl DroneBody<'_> {
    pub fn linear_velocity(&self) -> Vec3 {
        from_rapier(&self.body.linvel())
    }
}

impl FlightBody for DroneBody<'_> {
    fn world_position(&self) -> Vec3 {
        from_rapier(&self.body.translation())
    }

    fn orientation(&self) -> Quat {
        let r = self.body.rotation();
        Quat::from_xyzw(r.x, r.y, r.z, r.w)
    }

    fn angular_velocity(&self) -> Vec3 {
        from_rapier(&self.body.angvel())
    }

    fn reset_forces(&mut self) {
        self.body.reset_forces(true);
        self.body.reset_torques(true);
    }

    fn apply_local_force(&mut self, force: Vec3, local_point: Vec3) {
        let orientation = self.orientation();
        let world_force = orientation * force;
        self.body.add_force(to_rapier(world_force), true);
        if local_point != Vec3::ZERO {
            let arm = orientation * local_point;
            self.body.add_torque(to_rapier(arm.cross(world_force)), true);
        }
    }

    fn apply_torque(&mut self, torque: Vec3) {
        self.body.add_torque(to_rapier(torque), true);
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.body.set_angvel(to_rapier(angular_velocity), true);
    }
}
