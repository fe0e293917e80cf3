//! Physics integration for the drone scene: rigid bodies, sensors, collision
//! events, and world stepping.
//!
//! Wraps Rapier behind a single [`PhysicsWorld`] resource. The flight model
//! reaches the drone body through [`DroneBody`], which implements
//! [`quad_flight::FlightBody`].

use bevy_ecs::prelude::*;
use rapier3d::prelude::*;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, channel};

mod charging;
mod drone;
mod scene;

pub use drone::{DroneBody, DroneHandles, DroneSpec, spawn_drone};
pub use scene::{BodyTag, spawn_ground, spawn_station};

/// Rapier `Vector` from a glam vector.
pub(crate) fn to_rapier(v: glam::Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

/// Glam vector from a Rapier `Vector`.
pub(crate) fn from_rapier(v: &Vector) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}

/// Central physics simulation resource owning all Rapier state.
#[derive(Resource)]
pub struct PhysicsWorld {
    /// World-space gravity vector.
    pub gravity: Vector,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    /// Forwards collision start/stop events into `collision_events`.
    event_collector: ChannelEventCollector,
    /// Behind a mutex so the world stays `Sync` for the ECS.
    collision_events: Mutex<Receiver<CollisionEvent>>,
    // Contact force events are never enabled; the receiver only keeps the
    // channel open.
    _contact_force_events: Mutex<Receiver<ContactForceEvent>>,
    /// Station sensors the drone currently overlaps.
    docked: HashSet<ColliderHandle>,
}

impl PhysicsWorld {
    /// Creates a world with gravity `(0, -9.81, 0)` stepping at `dt` seconds.
    pub fn new(dt: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt,
            ..Default::default()
        };
        let (collision_send, collision_events) = channel();
        let (force_send, contact_force_events) = channel();

        Self {
            gravity: Vector::new(0.0, -9.81, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            event_collector: ChannelEventCollector::new(collision_send, force_send),
            collision_events: Mutex::new(collision_events),
            _contact_force_events: Mutex::new(contact_force_events),
            docked: HashSet::new(),
        }
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &self.event_collector,
        );
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = Vector::new(x, y, z);
    }

    pub fn gravity(&self) -> (f32, f32, f32) {
        (self.gravity.x, self.gravity.y, self.gravity.z)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

/// ECS system that steps the physics simulation once per invocation.
pub fn physics_step_system(mut physics: ResMut<PhysicsWorld>) {
    physics.step();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_initializes() {
        let world = PhysicsWorld::default();
        assert_eq!(world.rigid_body_set.len(), 0);
        assert_eq!(world.collider_set.len(), 0);
        assert_eq!(world.gravity(), (0.0, -9.81, 0.0));
    }

    #[test]
    fn test_world_is_an_ecs_resource() {
        fn insert<R: Resource>(world: &mut World, resource: R) {
            world.insert_resource(resource);
        }
        let mut world = World::new();
        insert(&mut world, PhysicsWorld::default());
        assert!(world.contains_resource::<PhysicsWorld>());
    }

    #[test]
    fn test_timestep_follows_constructor() {
        let world = PhysicsWorld::new(1.0 / 120.0);
        assert!((world.dt() - 1.0 / 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_step_advances_simulation() {
        let mut world = PhysicsWorld::default();
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(0.0, 10.0, 0.0))
            .build();
        let handle = world.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(0.5).build();
        world
            .collider_set
            .insert_with_parent(collider, handle, &mut world.rigid_body_set);

        for _ in 0..60 {
            world.step();
        }

        let pos = world.rigid_body_set[handle].translation();
        assert!(pos.y < 10.0, "Body should have fallen: y={}", pos.y);
    }

    #[test]
    fn test_conversions_round_trip() {
        let v = glam::Vec3::new(1.0, -2.0, 3.5);
        assert_eq!(from_rapier(&to_rapier(v)), v);
    }
}
