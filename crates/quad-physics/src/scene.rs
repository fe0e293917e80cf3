//! Static scene geometry: the ground plane and charging stations.

use rapier3d::prelude::*;

use crate::PhysicsWorld;

/// Identity stored in each collider's `user_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Drone,
    Station,
    Ground,
}

impl BodyTag {
    pub fn name(self) -> &'static str {
        match self {
            BodyTag::Drone => "DRONE",
            BodyTag::Station => "STATION",
            BodyTag::Ground => "GROUND",
        }
    }

    pub fn to_user_data(self) -> u128 {
        match self {
            BodyTag::Drone => 1,
            BodyTag::Station => 2,
            BodyTag::Ground => 3,
        }
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        match data {
            1 => Some(BodyTag::Drone),
            2 => Some(BodyTag::Station),
            3 => Some(BodyTag::Ground),
            _ => None,
        }
    }
}

impl PhysicsWorld {
    /// Tag of a live collider, if it carries one.
    pub fn tag_of(&self, collider: ColliderHandle) -> Option<BodyTag> {
        self.collider_set
            .get(collider)
            .and_then(|c| BodyTag::from_user_data(c.user_data))
    }
}

/// Half thickness of the ground slab (meters).
const GROUND_HALF_THICKNESS: f32 = 0.5;
/// Half extent of the ground slab along X and Z (meters).
const GROUND_HALF_EXTENT: f32 = 100.0;

/// Station pad half extents (meters): a flat volume the drone lands into.
const STATION_HALF_EXTENTS: [f32; 3] = [0.6, 0.3, 0.6];

/// Adds a fixed ground slab whose top face is the plane `y = 0`.
pub fn spawn_ground(physics: &mut PhysicsWorld) -> ColliderHandle {
    let body = RigidBodyBuilder::fixed()
        .translation(Vector::new(0.0, -GROUND_HALF_THICKNESS, 0.0))
        .build();
    let handle = physics.rigid_body_set.insert(body);
    let collider = ColliderBuilder::cuboid(
        GROUND_HALF_EXTENT,
        GROUND_HALF_THICKNESS,
        GROUND_HALF_EXTENT,
    )
    .friction(0.8)
    .user_data(BodyTag::Ground.to_user_data())
    .build();
    physics
        .collider_set
        .insert_with_parent(collider, handle, &mut physics.rigid_body_set)
}

/// Adds a charging station sensor whose bottom face sits at `base`.
///
/// The sensor does not block the drone; entering and leaving it produces
/// charge events.
pub fn spawn_station(physics: &mut PhysicsWorld, base: glam::Vec3) -> ColliderHandle {
    let [hx, hy, hz] = STATION_HALF_EXTENTS;
    let collider = ColliderBuilder::cuboid(hx, hy, hz)
        .translation(Vector::new(base.x, base.y + hy, base.z))
        .sensor(true)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .user_data(BodyTag::Station.to_user_data())
        .build();
    let handle = physics.collider_set.insert(collider);
    tracing::debug!(
        "Spawned {} sensor at ({:.2}, {:.2}, {:.2})",
        BodyTag::Station.name(),
        base.x,
        base.y,
        base.z
    );
    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_survive_user_data() {
        for tag in [BodyTag::Drone, BodyTag::Station, BodyTag::Ground] {
            assert_eq!(BodyTag::from_user_data(tag.to_user_data()), Some(tag));
        }
        assert_eq!(BodyTag::from_user_data(0), None);
    }

    #[test]
    fn test_spawned_colliders_are_tagged() {
        let mut physics = PhysicsWorld::default();
        let ground = spawn_ground(&mut physics);
        let station = spawn_station(&mut physics, glam::Vec3::new(4.0, 0.0, -4.0));
        assert_eq!(physics.tag_of(ground), Some(BodyTag::Ground));
        assert_eq!(physics.tag_of(station), Some(BodyTag::Station));
        assert!(physics.collider_set[station].is_sensor());
    }

    #[test]
    fn test_ground_top_is_zero() {
        let mut physics = PhysicsWorld::default();
        let ground = spawn_ground(&mut physics);
        let aabb = physics.collider_set[ground].compute_aabb();
        assert!(aabb.maxs.y.abs() < 1e-5, "ground top at {}", aabb.maxs.y);
    }
}
