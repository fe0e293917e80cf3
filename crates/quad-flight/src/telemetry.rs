//! Fixed-interval flight telemetry.

use crate::arbiter::ControlSource;
use crate::session::FlightSession;
use serde::Serialize;
use std::time::Duration;

/// A point-in-time view of the drone for logs and HUDs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub time_s: f64,
    pub frame: u64,
    pub source: ControlSource,
    pub altitude: f32,
    pub lift: f32,
    pub pitch_angle: f32,
    pub roll_angle: f32,
    pub yaw_velocity: f32,
    pub battery_pct: f32,
    pub charging: bool,
    pub auto_balance: bool,
    pub indicator: f32,
}

impl TelemetrySnapshot {
    pub fn capture(session: &FlightSession, time_s: f64) -> Self {
        let flight = session.flight();
        let battery = session.battery();
        Self {
            time_s,
            frame: session.frame(),
            source: session.source(),
            altitude: flight.altitude,
            lift: flight.lift,
            pitch_angle: flight.pitch_angle,
            roll_angle: flight.roll_angle,
            yaw_velocity: flight.yaw_velocity,
            battery_pct: battery.percentage(),
            charging: battery.charging(),
            auto_balance: flight.auto_balance,
            indicator: flight.indicator,
        }
    }
}

/// Emits a snapshot every `interval` of simulated time.
#[derive(Debug, Clone)]
pub struct TelemetrySampler {
    interval: Duration,
    since_last: Duration,
    elapsed: Duration,
}

impl TelemetrySampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            since_last: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn from_millis(interval_ms: u32) -> Self {
        Self::new(Duration::from_millis(u64::from(interval_ms)))
    }

    /// Total simulated time seen so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance by `dt` seconds; returns a snapshot when an interval elapsed.
    /// Negative or non-finite `dt` counts as no time.
    pub fn tick(&mut self, dt: f32, session: &FlightSession) -> Option<TelemetrySnapshot> {
        let step = Duration::try_from_secs_f32(dt).unwrap_or(Duration::ZERO);
        self.elapsed = self.elapsed.saturating_add(step);
        self.since_last = self.since_last.saturating_add(step);
        if self.since_last < self.interval {
            return None;
        }
        // One snapshot per tick even after a long stall.
        let remainder = self.since_last.as_nanos() % self.interval.as_nanos();
        self.since_last = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
        Some(TelemetrySnapshot::capture(
            session,
            self.elapsed.as_secs_f64(),
        ))
    }
}
