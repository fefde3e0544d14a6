//! Per-tick input arbitration between connected joysticks and the keyboard.

use tracing::{debug, info};

use crate::control::state::ControlState;

const NEUTRAL_AXES: (f32, f32) = (0.0, 0.0);

/// One joystick's stick sample for the current tick.
///
/// Axes are rounded to three decimals on construction; exact equality of the
/// rounded pair is the "no new input" criterion the arbiter works with.
/// Readings use the down-positive Y device convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceReading {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

impl DeviceReading {
    pub fn new(index: usize, x: f32, y: f32) -> Self {
        Self {
            index,
            x: round_axis(x),
            y: round_axis(y),
        }
    }

    pub fn axes(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

fn round_axis(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Decides, each tick, whether any connected joystick overrides the current
/// angle/throttle.
///
/// The failover policy lets a secondary device or the keyboard regain
/// control when the driving device goes idle: the device last accepted only
/// keeps control while its reading changes, and any other device takes over
/// as soon as it leaves neutral. Device index order is the priority order,
/// and at most one device drives per tick.
pub struct JoystickArbiter {
    enabled: bool,
    last_index: usize,
    last_reading: (f32, f32),
}

impl Default for JoystickArbiter {
    fn default() -> Self {
        Self {
            enabled: true,
            last_index: 0,
            last_reading: NEUTRAL_AXES,
        }
    }
}

impl JoystickArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flips the global joystick enable and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(
            "Joystick input {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
        self.enabled
    }

    /// Runs one arbitration pass over the ordered reading list. Returns
    /// whether a device took the axes this tick; when none does, whatever
    /// the keyboard produced stands.
    pub fn arbitrate(&mut self, state: &mut ControlState, readings: &[DeviceReading]) -> bool {
        if !self.enabled || readings.is_empty() {
            return false;
        }

        for reading in readings {
            let axes = reading.axes();
            let takes_over = if reading.index == self.last_index {
                // Active movement on the driving device: anything that
                // differs from the last accepted sample.
                axes != self.last_reading
            } else {
                // A secondary device leaving neutral means the operator
                // switched hands.
                axes != NEUTRAL_AXES
            };

            if takes_over {
                state.apply_axes(reading.x, -reading.y);
                self.last_reading = axes;
                self.last_index = reading.index;
                debug!(
                    "Joystick {} drives: angle={:.3} throttle={:.3}",
                    reading.index, state.angle, state.throttle
                );
                return true;
            }
        }

        false
    }
}
