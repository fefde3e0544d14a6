use serde::{Deserialize, Serialize};

/// Driving mode carried in every published command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    User,
    Pilot,
}

/// The authoritative command snapshot for the session.
///
/// Created once with all-neutral values, then mutated in place by the key
/// table and the joystick arbiter on every tick. The publication and overlay
/// paths only ever read it. The serde derives produce the wire format
/// directly: `angle`, `throttle`, `drive_mode` ("user"/"pilot"), `recording`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub angle: f32,
    pub throttle: f32,
    #[serde(rename = "drive_mode")]
    pub mode: DriveMode,
    pub recording: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            throttle: 0.0,
            mode: DriveMode::User,
            recording: false,
        }
    }
}

impl ControlState {
    pub fn increase_throttle(&mut self, step: f32) {
        self.throttle = (self.throttle + step).clamp(-1.0, 1.0);
    }

    pub fn decrease_throttle(&mut self, step: f32) {
        self.throttle = (self.throttle - step).clamp(-1.0, 1.0);
    }

    pub fn reset_throttle(&mut self) {
        self.throttle = 0.0;
    }

    pub fn steer_right(&mut self, step: f32) {
        self.angle = (self.angle + step).clamp(-1.0, 1.0);
    }

    pub fn steer_left(&mut self, step: f32) {
        self.angle = (self.angle - step).clamp(-1.0, 1.0);
    }

    pub fn reset_angle(&mut self) {
        self.angle = 0.0;
    }

    /// Entering Pilot always neutralizes both axes, even when already in
    /// Pilot; the autopilot starts from a clean slate and pending manual
    /// deltas are discarded. Entering User keeps whatever is set.
    pub fn set_mode(&mut self, mode: DriveMode) {
        self.mode = mode;
        if mode == DriveMode::Pilot {
            self.reset_angle();
            self.reset_throttle();
        }
    }

    pub fn toggle_recording(&mut self) {
        self.recording = !self.recording;
    }

    /// Joystick override path: sets both axes at once, clamped.
    pub fn apply_axes(&mut self, angle: f32, throttle: f32) {
        self.angle = angle.clamp(-1.0, 1.0);
        self.throttle = throttle.clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_saturates_at_upper_bound() {
        let mut state = ControlState::default();
        for _ in 0..4 {
            state.increase_throttle(0.25);
        }
        assert_eq!(state.throttle, 1.0);

        state.increase_throttle(0.25);
        assert_eq!(state.throttle, 1.0);
    }

    #[test]
    fn throttle_saturates_at_lower_bound() {
        let mut state = ControlState::default();
        for _ in 0..6 {
            state.decrease_throttle(0.25);
        }
        assert_eq!(state.throttle, -1.0);
    }

    #[test]
    fn axes_stay_bounded_under_mixed_sequences() {
        let mut state = ControlState::default();
        for _ in 0..10 {
            state.increase_throttle(0.4);
            state.steer_left(0.7);
            assert!((-1.0..=1.0).contains(&state.throttle));
            assert!((-1.0..=1.0).contains(&state.angle));
        }
        state.decrease_throttle(0.4);
        assert_eq!(state.throttle, 0.6);
    }

    #[test]
    fn pilot_mode_forces_neutral_axes() {
        let mut state = ControlState::default();
        state.apply_axes(0.5, -0.75);
        state.set_mode(DriveMode::Pilot);
        assert_eq!(state.mode, DriveMode::Pilot);
        assert_eq!(state.angle, 0.0);
        assert_eq!(state.throttle, 0.0);
    }

    #[test]
    fn user_mode_keeps_current_axes() {
        let mut state = ControlState::default();
        state.apply_axes(0.25, 0.5);
        state.set_mode(DriveMode::User);
        assert_eq!(state.angle, 0.25);
        assert_eq!(state.throttle, 0.5);
    }

    #[test]
    fn pilot_reentry_still_resets() {
        let mut state = ControlState::default();
        state.set_mode(DriveMode::Pilot);
        state.apply_axes(0.3, 0.3);
        state.set_mode(DriveMode::Pilot);
        assert_eq!(state.angle, 0.0);
        assert_eq!(state.throttle, 0.0);
    }

    #[test]
    fn recording_is_independent_of_mode() {
        let mut state = ControlState::default();
        state.toggle_recording();
        assert!(state.recording);
        state.set_mode(DriveMode::Pilot);
        assert!(state.recording);
        state.toggle_recording();
        assert!(!state.recording);
    }

    #[test]
    fn apply_axes_clamps_out_of_range_input() {
        let mut state = ControlState::default();
        state.apply_axes(1.5, -2.0);
        assert_eq!(state.angle, 1.0);
        assert_eq!(state.throttle, -1.0);
    }
}
