//! Battery model: drains while throttling, charges while docked.
//!
//! The battery never ticks on its own. The flight model applies drain and
//! charge steps inside its per-frame update, and collision callbacks only
//! flip the `charging` flag.

/// Full charge, in percent.
pub const FULL: f32 = 100.0;

/// Docking transitions reported by the physics binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeEvent {
    /// The drone entered a charging station volume.
    Begin,
    /// The drone left a charging station volume.
    End,
}

/// Charge level and docking flag. `percentage` stays in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    percentage: f32,
    charging: bool,
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::new(FULL)
    }
}

impl BatteryState {
    pub fn new(percentage: f32) -> Self {
        Self {
            percentage: clamp_percentage(percentage),
            charging: false,
        }
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn charging(&self) -> bool {
        self.charging
    }

    /// Set the docking flag.
    pub fn charge(&mut self, active: bool) {
        if self.charging != active {
            tracing::debug!(
                "Battery charging {} at {:.1}%",
                if active { "started" } else { "stopped" },
                self.percentage
            );
        }
        self.charging = active;
    }

    pub fn on_charge_event(&mut self, event: ChargeEvent) {
        self.charge(event == ChargeEvent::Begin);
    }

    pub fn drain(&mut self, step: f32) {
        self.set_percentage(self.percentage - step.abs());
    }

    pub fn recharge(&mut self, step: f32) {
        self.set_percentage(self.percentage + step.abs());
    }

    pub fn set_percentage(&mut self, percentage: f32) {
        self.percentage = clamp_percentage(percentage);
    }

    pub fn is_empty(&self) -> bool {
        self.percentage <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.percentage >= FULL
    }

    /// Gauge value: 0 is empty (red), 1 is full (green).
    pub fn indicator(&self) -> f32 {
        (self.percentage / FULL).clamp(0.0, 1.0)
    }
}

fn clamp_percentage(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, FULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        assert_eq!(BatteryState::new(250.0).percentage(), 100.0);
        assert_eq!(BatteryState::new(-3.0).percentage(), 0.0);
        assert_eq!(BatteryState::new(f32::NAN).percentage(), 0.0);
    }

    #[test]
    fn test_any_sequence_stays_in_range() {
        let mut battery = BatteryState::new(50.0);
        let steps = [
            (true, 30.0),
            (false, 90.0),
            (true, 0.5),
            (true, 200.0),
            (false, 1.0),
            (false, 0.025),
            (true, 0.1),
        ];
        for (charge, step) in steps {
            if charge {
                battery.recharge(step);
            } else {
                battery.drain(step);
            }
            assert!((0.0..=100.0).contains(&battery.percentage()));
        }
    }

    #[test]
    fn test_negative_steps_keep_direction() {
        let mut battery = BatteryState::new(50.0);
        battery.drain(-10.0);
        assert_eq!(battery.percentage(), 40.0);
        battery.recharge(-5.0);
        assert_eq!(battery.percentage(), 45.0);
    }

    #[test]
    fn test_charge_events_toggle_flag() {
        let mut battery = BatteryState::default();
        battery.on_charge_event(ChargeEvent::Begin);
        assert!(battery.charging());
        battery.drain(1.0);
        assert!(battery.charging());
        battery.on_charge_event(ChargeEvent::End);
        assert!(!battery.charging());
    }

    #[test]
    fn test_indicator_mapping() {
        assert_eq!(BatteryState::new(0.0).indicator(), 0.0);
        assert_eq!(BatteryState::new(25.0).indicator(), 0.25);
        assert_eq!(BatteryState::new(100.0).indicator(), 1.0);
        assert!(BatteryState::new(0.0).is_empty());
        assert!(BatteryState::new(100.0).is_full());
    }
}
