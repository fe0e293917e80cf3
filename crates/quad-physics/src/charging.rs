//! Turns drone/station collision events into charge events.

use quad_flight::ChargeEvent;
use rapier3d::prelude::*;
use std::sync::PoisonError;

use crate::PhysicsWorld;
use crate::scene::BodyTag;

impl PhysicsWorld {
    /// Drain collision events from the last step(s) and report docking
    /// transitions.
    ///
    /// Overlapping stations count as one dock: `Begin` fires when the drone
    /// enters its first station and `End` when it leaves its last one.
    /// Contacts with the ground or between untagged colliders are ignored.
    pub fn drain_charge_events(&mut self) -> Vec<ChargeEvent> {
        let pending: Vec<CollisionEvent> = self
            .collision_events
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .try_iter()
            .collect();
        let mut events = Vec::new();
        for event in pending {
            let Some(station) = self.station_touching_drone(event.collider1(), event.collider2())
            else {
                continue;
            };
            let was_docked = !self.docked.is_empty();
            if event.started() {
                self.docked.insert(station);
            } else {
                self.docked.remove(&station);
            }
            match (was_docked, !self.docked.is_empty()) {
                (false, true) => events.push(ChargeEvent::Begin),
                (true, false) => events.push(ChargeEvent::End),
                _ => {}
            }
        }
        for event in &events {
            tracing::debug!("Charge event {event:?}");
        }
        events
    }

    /// Whether the drone currently overlaps any station.
    pub fn is_docked(&self) -> bool {
        !self.docked.is_empty()
    }

    /// The station handle if the pair is drone + station, in either order.
    ///
    /// A removed collider has no tag; its events still end a dock it started.
    fn station_touching_drone(&self, a: ColliderHandle, b: ColliderHandle) -> Option<ColliderHandle> {
        let tag_a = self.tag_of(a);
        let tag_b = self.tag_of(b);
        match (tag_a, tag_b) {
            (Some(BodyTag::Drone), Some(BodyTag::Station)) => Some(b),
            (Some(BodyTag::Station), Some(BodyTag::Drone)) => Some(a),
            (Some(BodyTag::Drone), None) if self.docked.contains(&b) => Some(b),
            (None, Some(BodyTag::Drone)) if self.docked.contains(&a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DroneSpec, PhysicsWorld, spawn_drone, spawn_ground, spawn_station};
    use glam::Vec3;
    use quad_flight::ChargeEvent;

    #[test]
    fn test_landing_on_station_begins_and_leaving_ends() {
        let mut physics = PhysicsWorld::default();
        spawn_ground(&mut physics);
        spawn_station(&mut physics, Vec3::new(4.0, 0.0, -4.0));
        let drone = spawn_drone(&mut physics, &DroneSpec::default(), Vec3::new(4.0, 0.1, -4.0));

        physics.step();
        assert_eq!(physics.drain_charge_events(), vec![ChargeEvent::Begin]);
        assert!(physics.is_docked());

        // Staying put reports nothing new.
        physics.step();
        assert!(physics.drain_charge_events().is_empty());

        physics.teleport_drone(&drone, Vec3::new(0.0, 0.1, 0.0));
        physics.step();
        assert_eq!(physics.drain_charge_events(), vec![ChargeEvent::End]);
        assert!(!physics.is_docked());
    }

    #[test]
    fn test_ground_contact_is_not_charging() {
        let mut physics = PhysicsWorld::default();
        spawn_ground(&mut physics);
        spawn_drone(&mut physics, &DroneSpec::default(), Vec3::new(0.0, 1.0, 0.0));
        for _ in 0..60 {
            physics.step();
        }
        assert!(physics.drain_charge_events().is_empty());
        assert!(!physics.is_docked());
    }

    #[test]
    fn test_overlapping_stations_count_once() {
        let mut physics = PhysicsWorld::default();
        physics.set_gravity(0.0, 0.0, 0.0);
        spawn_station(&mut physics, Vec3::new(0.0, 0.0, 0.0));
        spawn_station(&mut physics, Vec3::new(0.5, 0.0, 0.0));
        let drone = spawn_drone(&mut physics, &DroneSpec::default(), Vec3::new(0.25, 0.3, 0.0));

        physics.step();
        assert_eq!(physics.drain_charge_events(), vec![ChargeEvent::Begin]);

        physics.teleport_drone(&drone, Vec3::new(0.0, 10.0, 0.0));
        physics.step();
        assert_eq!(physics.drain_charge_events(), vec![ChargeEvent::End]);
    }
}
