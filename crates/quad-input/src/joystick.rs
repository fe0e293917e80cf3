//! Joystick-class input: the double buffer between asynchronous UI callbacks
//! and the frame loop, plus the on-screen touch stick that feeds it.
//!
//! Writers (touch handlers, gamepad polling) push [`StickSample`]s through a
//! channel at any time. The frame loop calls [`JoystickReader::swap`] once at
//! frame start; that applies every pending write in arrival order to the front
//! [`ControlInputs`], which then stays fixed for the rest of the frame. Last
//! write wins per stick and a half-written sample is never observed.

use crate::controls::{ControlInputs, Stick, StickSample, apply_radial_deadzone};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::Vec2;
use winit::event::TouchPhase;

/// Create a connected writer/reader pair.
pub fn joystick_channel() -> (JoystickWriter, JoystickReader) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        JoystickWriter { tx },
        JoystickReader {
            rx,
            front: ControlInputs::NEUTRAL,
        },
    )
}

/// Producer side. Cheap to clone; one per input source.
#[derive(Debug, Clone)]
pub struct JoystickWriter {
    tx: Sender<StickSample>,
}

impl JoystickWriter {
    /// Queue a sample for the next frame. Returns `false` once the reader is gone.
    pub fn write(&self, sample: StickSample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Disconnected(_)) => false,
            // Unbounded channels never report Full.
            Err(TrySendError::Full(_)) => true,
        }
    }
}

/// Consumer side, owned by the flight session.
#[derive(Debug)]
pub struct JoystickReader {
    rx: Receiver<StickSample>,
    front: ControlInputs,
}

impl JoystickReader {
    /// Publish pending writes to the front buffer. Returns how many were applied.
    pub fn swap(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(sample) = self.rx.try_recv() {
            self.front.apply_stick(sample);
            applied += 1;
        }
        applied
    }

    /// Controls as of the last [`swap`](Self::swap).
    pub fn front(&self) -> &ControlInputs {
        &self.front
    }

    /// Recenter both sticks, dropping anything still queued.
    pub fn reset(&mut self) {
        while self.rx.try_recv().is_ok() {}
        self.front = ControlInputs::NEUTRAL;
    }
}

/// An on-screen thumb stick driven by touch or pointer events.
///
/// The stick captures the first touch that starts inside its base circle and
/// follows only that touch until it ends. Screen coordinates grow downward;
/// samples are reported with y up.
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    stick: Stick,
    /// Base circle center in screen pixels.
    center: Vec2,
    /// Base circle radius in screen pixels.
    radius: f32,
    deadzone: f32,
    captured: Option<u64>,
}

impl VirtualJoystick {
    pub fn new(stick: Stick, center: Vec2, radius: f32, deadzone: f32) -> Self {
        Self {
            stick,
            center,
            radius: radius.max(1.0),
            deadzone,
            captured: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.captured.is_some()
    }

    /// Feed one touch event. Returns the sample to publish, if this stick
    /// owns the touch.
    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> Option<StickSample> {
        match phase {
            TouchPhase::Started => {
                if self.captured.is_some() || position.distance(self.center) > self.radius {
                    return None;
                }
                self.captured = Some(id);
                Some(self.sample_at(position))
            }
            TouchPhase::Moved if self.captured == Some(id) => Some(self.sample_at(position)),
            TouchPhase::Ended | TouchPhase::Cancelled if self.captured == Some(id) => {
                self.captured = None;
                Some(StickSample::released(self.stick))
            }
            _ => None,
        }
    }

    fn sample_at(&self, position: Vec2) -> StickSample {
        let offset = (position - self.center) / self.radius;
        let raw = Vec2::new(offset.x, -offset.y).clamp_length_max(1.0);
        StickSample::held(self.stick, apply_radial_deadzone(raw, self.deadzone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_publishes_pending_writes() {
        let (writer, mut reader) = joystick_channel();
        assert!(writer.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, 1.0))));

        // Nothing is visible until the frame swaps.
        assert_eq!(*reader.front(), ControlInputs::NEUTRAL);
        assert_eq!(reader.swap(), 1);
        assert!(reader.front().throttling);
        assert_eq!(reader.front().thrust_axis, 1.0);
    }

    #[test]
    fn test_last_write_wins() {
        let (writer, mut reader) = joystick_channel();
        for y in [0.2, 0.4, 0.9] {
            writer.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, y)));
        }
        reader.swap();
        assert_eq!(reader.front().thrust_axis, 0.9);
    }

    #[test]
    fn test_front_is_stable_between_swaps() {
        let (writer, mut reader) = joystick_channel();
        writer.write(StickSample::held(Stick::PitchRoll, Vec2::new(0.5, 0.5)));
        reader.swap();
        writer.write(StickSample::released(Stick::PitchRoll));
        assert!(reader.front().pitching);
        reader.swap();
        assert!(!reader.front().pitching);
    }

    #[test]
    fn test_sticks_are_independent() {
        let (writer, mut reader) = joystick_channel();
        writer.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, 0.7)));
        writer.write(StickSample::held(Stick::PitchRoll, Vec2::new(-0.3, 0.0)));
        writer.write(StickSample::released(Stick::PitchRoll));
        reader.swap();
        assert!(reader.front().throttling);
        assert!(!reader.front().rolling);
    }

    #[test]
    fn test_cloned_writers_share_reader() {
        let (writer, mut reader) = joystick_channel();
        let gamepad = writer.clone();
        writer.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, 0.5)));
        gamepad.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, -0.5)));
        assert_eq!(reader.swap(), 2);
        assert_eq!(reader.front().thrust_axis, -0.5);
    }

    #[test]
    fn test_write_after_reader_dropped() {
        let (writer, reader) = joystick_channel();
        drop(reader);
        assert!(!writer.write(StickSample::released(Stick::ThrustYaw)));
    }

    #[test]
    fn test_reset_discards_queue() {
        let (writer, mut reader) = joystick_channel();
        writer.write(StickSample::held(Stick::ThrustYaw, Vec2::new(0.0, 1.0)));
        reader.reset();
        assert_eq!(reader.swap(), 0);
        assert_eq!(*reader.front(), ControlInputs::NEUTRAL);
    }

    #[test]
    fn test_virtual_stick_capture_and_release() {
        let mut stick = VirtualJoystick::new(Stick::ThrustYaw, Vec2::new(100.0, 500.0), 50.0, 0.0);

        // Outside the base circle: ignored.
        assert!(stick.on_touch(1, TouchPhase::Started, Vec2::new(300.0, 500.0)).is_none());

        // Drag straight up by the full radius: full thrust.
        stick.on_touch(2, TouchPhase::Started, Vec2::new(100.0, 500.0));
        let sample = stick.on_touch(2, TouchPhase::Moved, Vec2::new(100.0, 450.0)).unwrap();
        assert!(sample.held);
        assert!((sample.value.y - 1.0).abs() < 1e-5);

        // A second finger does not steal the stick.
        assert!(stick.on_touch(3, TouchPhase::Moved, Vec2::new(90.0, 500.0)).is_none());

        let released = stick.on_touch(2, TouchPhase::Ended, Vec2::new(100.0, 450.0)).unwrap();
        assert!(!released.held);
        assert!(!stick.is_held());
    }

    #[test]
    fn test_virtual_stick_saturates_outside_radius() {
        let mut stick = VirtualJoystick::new(Stick::PitchRoll, Vec2::ZERO, 10.0, 0.0);
        stick.on_touch(7, TouchPhase::Started, Vec2::ZERO);
        let sample = stick.on_touch(7, TouchPhase::Moved, Vec2::new(40.0, 0.0)).unwrap();
        assert!((sample.value.length() - 1.0).abs() < 1e-5);
    }
}
