//! Per-frame flight dynamics.
//!
//! [`FlightModel::update`] turns one frame of [`ControlInputs`] into forces on
//! a [`FlightBody`]:
//!
//! 1. Read altitude and orientation from the body.
//! 2. Charge the battery if docked.
//! 3. Compute lift from the altitude-interpolated lift curve, scaled by
//!    battery charge. Throttling drains the battery; idle frames decay lift.
//! 4. Compute pitch/roll torques from stick input, or from auto-balance
//!    feedback when the stick is released.
//! 5. Clear the body's accumulators and apply lift, attitude torque and yaw.
//! 6. Store the new attitude, propeller angle and battery indicator.

use crate::battery::BatteryState;
use crate::body::FlightBody;
use glam::{EulerRot, Quat, Vec3};
use quad_config::{BatteryConfig, FlightTuning, YawMode};
use quad_input::ControlInputs;
use serde::Serialize;
use std::f32::consts::TAU;

/// Mutable per-drone flight state carried between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightState {
    /// Height above the resting plane, as of the last update.
    pub altitude: f32,
    /// Current upward thrust (N), never negative.
    pub lift: f32,
    pub pitch_velocity: f32,
    /// Pitch (radians) read back from the body after the last update.
    pub pitch_angle: f32,
    pub roll_velocity: f32,
    /// Roll (radians) read back from the body after the last update.
    pub roll_angle: f32,
    pub yaw_velocity: f32,
    pub auto_balance: bool,
    /// Rotor spin phase for rendering, in `[0, TAU)`.
    pub propeller_angle: f32,
    /// Battery gauge in `[0, 1]`.
    pub indicator: f32,
}

impl FlightState {
    pub fn new(auto_balance: bool) -> Self {
        Self {
            altitude: 0.0,
            lift: 0.0,
            pitch_velocity: 0.0,
            pitch_angle: 0.0,
            roll_velocity: 0.0,
            roll_angle: 0.0,
            yaw_velocity: 0.0,
            auto_balance,
            propeller_angle: 0.0,
            indicator: 1.0,
        }
    }

    /// Zero every motion term, keeping the auto-balance preference.
    pub fn settle(&mut self) {
        *self = Self {
            indicator: self.indicator,
            ..Self::new(self.auto_balance)
        };
    }
}

/// What one update pushed into the body, for telemetry and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameForces {
    /// Body-frame force applied at the body origin.
    pub local_force: Vec3,
    /// World-space attitude torque (pitch/roll).
    pub attitude_torque: Vec3,
    /// World-space yaw torque, only in [`YawMode::Torque`].
    pub yaw_torque: Vec3,
    /// Whether the drone was high enough to yaw this frame.
    pub maneuvering: bool,
}

/// The flight model: tuning plus the pure curve functions.
#[derive(Debug, Clone)]
pub struct FlightModel {
    tuning: FlightTuning,
    drain_per_frame: f32,
    charge_per_frame: f32,
}

impl FlightModel {
    pub fn new(tuning: FlightTuning, battery: &BatteryConfig) -> Self {
        Self {
            tuning,
            drain_per_frame: battery.drain_per_frame,
            charge_per_frame: battery.charge_per_frame,
        }
    }

    pub fn tuning(&self) -> &FlightTuning {
        &self.tuning
    }

    /// Height above the resting plane for a body centered at `position`.
    pub fn altitude(&self, position: Vec3) -> f32 {
        (position.y - self.tuning.resting_height / 2.0).abs()
    }

    /// Shrink a lift level toward `failing_lift` as the battery drains.
    pub fn battery_scaled(&self, lift: f32, percentage: f32) -> f32 {
        let failing = self.tuning.failing_lift;
        failing + (lift - failing) * (percentage / 100.0)
    }

    /// Full-throttle lift at `altitude`: ample near the ground, stable at
    /// `max_altitude` and above.
    pub fn target_lift(&self, altitude: f32, percentage: f32) -> f32 {
        let ample = self.battery_scaled(self.tuning.ample_lift, percentage);
        let stable = self.battery_scaled(self.tuning.stable_lift, percentage);
        let t = if self.tuning.max_altitude > 0.0 {
            (altitude / self.tuning.max_altitude).clamp(0.0, 1.0)
        } else {
            1.0
        };
        ample + (stable - ample) * t
    }

    /// Advance one frame.
    pub fn update(
        &self,
        inputs: &ControlInputs,
        dt: f32,
        flight: &mut FlightState,
        battery: &mut BatteryState,
        body: &mut dyn FlightBody,
    ) -> FrameForces {
        let inputs = inputs.clamped();
        let tuning = &self.tuning;
        let orientation = body.orientation();
        let altitude = self.altitude(body.world_position());
        flight.altitude = altitude;

        if battery.charging() {
            battery.recharge(self.charge_per_frame);
        }

        let throttled = inputs.throttling && !battery.is_empty();
        flight.lift = if battery.is_empty() {
            0.0
        } else if inputs.throttling {
            let target = self.target_lift(altitude, battery.percentage());
            battery.drain(self.drain_per_frame);
            (target * inputs.thrust_axis).max(0.0)
        } else {
            (flight.lift - tuning.lift_decay_per_frame).max(0.0)
        };

        flight.pitch_velocity = attitude_rate(
            inputs.pitching,
            inputs.pitch_axis,
            tuning.max_pitch,
            flight.pitch_angle,
            flight.auto_balance,
            tuning.balance_gain,
        );
        flight.roll_velocity = attitude_rate(
            inputs.rolling,
            inputs.roll_axis,
            tuning.max_roll,
            flight.roll_angle,
            flight.auto_balance,
            tuning.balance_gain,
        );
        flight.yaw_velocity = if inputs.yawing {
            -inputs.yaw_axis * tuning.max_yaw
        } else {
            0.0
        };

        body.reset_forces();
        let local_force = Vec3::new(0.0, flight.lift, -flight.lift * tuning.forward_momentum);
        body.apply_local_force(local_force, Vec3::ZERO);

        let maneuvering = altitude > tuning.maneuver_altitude;
        let mut yaw_torque = Vec3::ZERO;
        if maneuvering {
            let up = orientation * Vec3::Y;
            match tuning.yaw_mode {
                YawMode::AngularVelocity => {
                    let angvel = body.angular_velocity();
                    let steered = angvel - up * angvel.dot(up) + up * flight.yaw_velocity;
                    body.set_angular_velocity(steered);
                }
                YawMode::Torque => {
                    yaw_torque = up * flight.yaw_velocity;
                    body.apply_torque(yaw_torque);
                }
            }
        }

        let attitude_torque =
            orientation * Vec3::new(flight.pitch_velocity, 0.0, flight.roll_velocity);
        body.apply_torque(attitude_torque);

        let (pitch, roll) = pitch_roll_from_orientation(orientation);
        flight.pitch_angle = pitch;
        flight.roll_angle = roll;

        if throttled {
            let spin = tuning.propeller_speed * (0.5 + 0.5 * battery.percentage() / 100.0);
            flight.propeller_angle = (flight.propeller_angle + spin * dt).rem_euclid(TAU);
        }
        flight.indicator = battery.indicator();

        FrameForces {
            local_force,
            attitude_torque,
            yaw_torque,
            maneuvering,
        }
    }
}

/// Stick-driven rate when the gate is held, otherwise auto-balance feedback
/// toward level, otherwise nothing.
fn attitude_rate(
    gate: bool,
    axis: f32,
    max_rate: f32,
    angle: f32,
    auto_balance: bool,
    gain: f32,
) -> f32 {
    if gate {
        -axis * max_rate
    } else if auto_balance {
        -angle * gain
    } else {
        0.0
    }
}

/// Pitch (about X) and roll (about Z) of `orientation`, decomposed in Y-X-Z
/// order so heading does not leak into either angle.
pub fn pitch_roll_from_orientation(orientation: Quat) -> (f32, f32) {
    let (_yaw, pitch, roll) = orientation.to_euler(EulerRot::YXZ);
    (pitch, roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RecordingBody;

    const EPS: f32 = 1e-5;
    const DT: f32 = 1.0 / 60.0;

    fn model() -> FlightModel {
        FlightModel::new(FlightTuning::default(), &BatteryConfig::default())
    }

    /// A body resting exactly on the ground plane.
    fn grounded(model: &FlightModel) -> RecordingBody {
        RecordingBody::at(Vec3::new(0.0, model.tuning().resting_height / 2.0, 0.0))
    }

    fn full_throttle() -> ControlInputs {
        ControlInputs {
            throttling: true,
            thrust_axis: 1.0,
            ..ControlInputs::NEUTRAL
        }
    }

    #[test]
    fn test_lift_curve_endpoints() {
        let m = model();
        let t = m.tuning().clone();
        assert!((m.target_lift(0.0, 100.0) - t.ample_lift).abs() < EPS);
        assert!((m.target_lift(t.max_altitude, 100.0) - t.stable_lift).abs() < EPS);
        assert!((m.target_lift(t.max_altitude * 5.0, 100.0) - t.stable_lift).abs() < EPS);
        // An empty battery collapses both ends of the curve to failing lift.
        assert!((m.target_lift(0.0, 0.0) - t.failing_lift).abs() < EPS);
        assert!((m.target_lift(t.max_altitude, 0.0) - t.failing_lift).abs() < EPS);
    }

    #[test]
    fn test_lift_is_higher_near_ground() {
        let m = model();
        let mut low_body = grounded(&m);
        let mut high_body = RecordingBody::at(Vec3::new(0.0, m.tuning().max_altitude + 1.0, 0.0));

        let mut low = FlightState::new(true);
        let mut high = FlightState::new(true);
        m.update(&full_throttle(), DT, &mut low, &mut BatteryState::default(), &mut low_body);
        m.update(&full_throttle(), DT, &mut high, &mut BatteryState::default(), &mut high_body);

        assert!(low.lift >= high.lift);
        assert!(low.lift <= m.tuning().ample_lift);
    }

    #[test]
    fn test_throttle_drains_every_frame() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let mut battery = BatteryState::new(100.0);

        let mut previous = battery.percentage();
        for _ in 0..10 {
            m.update(&full_throttle(), DT, &mut flight, &mut battery, &mut body);
            assert!(battery.percentage() < previous);
            assert!((previous - battery.percentage() - 0.025).abs() < 1e-4);
            assert!(flight.lift > 0.0);
            assert!(flight.lift <= m.tuning().ample_lift + EPS);
            previous = battery.percentage();
        }
        assert!((battery.percentage() - 99.75).abs() < 1e-3);
    }

    #[test]
    fn test_empty_battery_gives_no_lift() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        flight.lift = 12.0;
        let mut battery = BatteryState::new(0.0);

        let forces = m.update(&full_throttle(), DT, &mut flight, &mut battery, &mut body);
        assert_eq!(flight.lift, 0.0);
        assert_eq!(forces.local_force, Vec3::ZERO);
        assert_eq!(flight.propeller_angle, 0.0);
    }

    #[test]
    fn test_negative_thrust_never_pulls_down() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let inputs = ControlInputs {
            thrust_axis: -1.0,
            ..full_throttle()
        };
        m.update(&inputs, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert_eq!(flight.lift, 0.0);
    }

    #[test]
    fn test_idle_lift_decays_to_zero() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        flight.lift = 0.5;
        let mut battery = BatteryState::default();

        m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut battery, &mut body);
        assert!((flight.lift - 0.3).abs() < EPS);
        for _ in 0..5 {
            m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut battery, &mut body);
        }
        assert_eq!(flight.lift, 0.0);
        // Idle frames never drain.
        assert_eq!(battery.percentage(), 100.0);
    }

    #[test]
    fn test_auto_balance_pushes_back_toward_level() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        flight.pitch_angle = 0.3;
        flight.roll_angle = -0.2;

        let forces =
            m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut BatteryState::default(), &mut body);
        let gain = m.tuning().balance_gain;
        assert!((flight.pitch_velocity - -0.3 * gain).abs() < EPS);
        assert!((flight.roll_velocity - 0.2 * gain).abs() < EPS);

        let torque = forces.attitude_torque;
        assert!(torque.x < 0.0 && torque.z > 0.0);
        assert!((torque.x.abs() - 0.3 * gain).abs() < EPS);
        assert!((torque.z.abs() - 0.2 * gain).abs() < EPS);
        assert_eq!(torque.y, 0.0);
        assert!((body.torque - torque).length() < EPS);
    }

    #[test]
    fn test_auto_balance_torque_follows_heading() {
        let m = model();
        let mut body = grounded(&m);
        let tilt = Quat::from_euler(EulerRot::YXZ, 0.0, 0.3, -0.2);
        body.rotation = Quat::from_rotation_y(1.2) * tilt;
        let mut flight = FlightState::new(true);
        flight.pitch_angle = 0.3;
        flight.roll_angle = -0.2;

        let forces =
            m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut BatteryState::default(), &mut body);
        let gain = m.tuning().balance_gain;
        let local = Vec3::new(-0.3 * gain, 0.0, 0.2 * gain);
        assert!((forces.attitude_torque - body.rotation * local).length() < EPS);
        assert!((forces.attitude_torque.length() - local.length()).abs() < EPS);
        // Not the unrotated vector: the torque turns with the drone.
        assert!((forces.attitude_torque - local).length() > 0.1 * gain);

        let in_body = body.rotation.inverse() * forces.attitude_torque;
        assert!(in_body.x < 0.0 && in_body.z > 0.0);
        assert!((flight.pitch_angle - 0.3).abs() < 1e-4);
        assert!((flight.roll_angle - -0.2).abs() < 1e-4);
    }

    #[test]
    fn test_no_auto_balance_means_no_torque() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(false);
        flight.pitch_angle = 0.3;
        flight.roll_angle = 0.4;

        let forces =
            m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert_eq!(flight.pitch_velocity, 0.0);
        assert_eq!(flight.roll_velocity, 0.0);
        assert_eq!(forces.attitude_torque, Vec3::ZERO);
    }

    #[test]
    fn test_stick_overrides_auto_balance() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        flight.pitch_angle = 0.3;
        let inputs = ControlInputs {
            pitching: true,
            pitch_axis: 0.5,
            ..ControlInputs::NEUTRAL
        };
        m.update(&inputs, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert!((flight.pitch_velocity - -0.5 * m.tuning().max_pitch).abs() < EPS);
    }

    #[test]
    fn test_yaw_is_zero_without_input() {
        let m = model();
        let mut body = RecordingBody::at(Vec3::new(0.0, 3.0, 0.0));
        body.angvel = Vec3::new(0.1, 0.8, 0.0);
        let mut flight = FlightState::new(true);
        for _ in 0..5 {
            m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut BatteryState::default(), &mut body);
            assert_eq!(flight.yaw_velocity, 0.0);
        }
        // Airborne with no yaw input: the up component is pinned to zero.
        assert!(body.angvel.y.abs() < EPS);
        assert!((body.angvel.x - 0.1).abs() < EPS);
    }

    #[test]
    fn test_yaw_waits_for_maneuver_altitude() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let inputs = ControlInputs {
            yawing: true,
            yaw_axis: 1.0,
            ..ControlInputs::NEUTRAL
        };
        let forces = m.update(&inputs, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert!(!forces.maneuvering);
        assert_eq!(body.angvel, Vec3::ZERO);
        assert!((flight.yaw_velocity - -m.tuning().max_yaw).abs() < EPS);

        body.position.y = 2.0;
        let forces = m.update(&inputs, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert!(forces.maneuvering);
        assert!((body.angvel.y - -m.tuning().max_yaw).abs() < EPS);
    }

    #[test]
    fn test_torque_yaw_mode() {
        let tuning = FlightTuning {
            yaw_mode: YawMode::Torque,
            ..FlightTuning::default()
        };
        let m = FlightModel::new(tuning, &BatteryConfig::default());
        let mut body = RecordingBody::at(Vec3::new(0.0, 2.0, 0.0));
        let mut flight = FlightState::new(false);
        let inputs = ControlInputs {
            yawing: true,
            yaw_axis: -0.5,
            ..ControlInputs::NEUTRAL
        };
        let forces = m.update(&inputs, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert!((forces.yaw_torque.y - 0.5 * m.tuning().max_yaw).abs() < EPS);
        assert!((body.torque.y - forces.yaw_torque.y).abs() < EPS);
        assert_eq!(body.angvel, Vec3::ZERO);
    }

    #[test]
    fn test_forces_are_rebuilt_each_frame() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let mut battery = BatteryState::default();
        m.update(&full_throttle(), DT, &mut flight, &mut battery, &mut body);
        m.update(&full_throttle(), DT, &mut flight, &mut battery, &mut body);
        assert_eq!(body.resets, 2);
        // Only this frame's lift, not the sum of two frames.
        assert!((body.force.y - flight.lift).abs() < EPS);
        assert!((body.force.z - -flight.lift * m.tuning().forward_momentum).abs() < EPS);
        assert_eq!(body.force_point, Vec3::ZERO);
    }

    #[test]
    fn test_docked_battery_charges() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let mut battery = BatteryState::new(50.0);
        battery.charge(true);
        m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut battery, &mut body);
        assert!((battery.percentage() - 50.1).abs() < 1e-4);
        assert!((flight.indicator - 0.501).abs() < 1e-4);
    }

    #[test]
    fn test_attitude_read_back_from_body() {
        let m = model();
        let mut body = grounded(&m);
        body.rotation = Quat::from_euler(EulerRot::YXZ, 1.0, 0.2, -0.1);
        let mut flight = FlightState::new(true);
        m.update(&ControlInputs::NEUTRAL, DT, &mut flight, &mut BatteryState::default(), &mut body);
        assert!((flight.pitch_angle - 0.2).abs() < 1e-4);
        assert!((flight.roll_angle - -0.1).abs() < 1e-4);
    }

    #[test]
    fn test_propeller_wraps() {
        let m = model();
        let mut body = grounded(&m);
        let mut flight = FlightState::new(true);
        let mut battery = BatteryState::default();
        for _ in 0..600 {
            m.update(&full_throttle(), DT, &mut flight, &mut battery, &mut body);
            assert!((0.0..TAU).contains(&flight.propeller_angle));
        }
    }
}
