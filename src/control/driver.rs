//! The control loop: one tick per inbound video frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::control::arbiter::{DeviceReading, JoystickArbiter};
use crate::control::keymap::{ControlAction, KeyMap};
use crate::control::state::{ControlState, DriveMode};
use crate::input::keys::Key;

/// Step sizes applied by the discrete keyboard actions.
///
/// Both values must be within (0, 1]; [`crate::config::TeleopConfig`]
/// rejects anything else before a session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Throttle delta per forward/backward key press.
    pub throttle_step: f32,

    /// Angle delta per left/right key press.
    pub angle_step: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            throttle_step: 0.25,
            angle_step: 0.25,
        }
    }
}

/// Read-only view handed to the overlay after every tick.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub state: ControlState,
    pub display_help: bool,
    pub joysticks_enabled: bool,
}

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// The command snapshot to publish.
    pub command: ControlState,

    /// The snapshot the overlay renders.
    pub render: RenderSnapshot,

    /// Set when the operator requested session teardown; no further ticks
    /// may run after this.
    pub exit: bool,
}

/// Orchestrates one control tick: key action, then arbitration, then the
/// outgoing snapshots. Owns the session's command state and runs exactly
/// once per inbound frame; it has no timer of its own.
pub struct ControlLoop {
    state: ControlState,
    keymap: KeyMap,
    arbiter: JoystickArbiter,
    settings: ControlSettings,
    display_help: bool,
}

impl ControlLoop {
    pub fn new(settings: ControlSettings) -> Self {
        info!("Initializing control loop with settings: {:?}", settings);
        Self {
            state: ControlState::default(),
            keymap: KeyMap::default_config(),
            arbiter: JoystickArbiter::new(),
            settings,
            display_help: false,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Snapshot of the current session for the overlay, without ticking.
    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            state: self.state.clone(),
            display_help: self.display_help,
            joysticks_enabled: self.arbiter.enabled(),
        }
    }

    /// Runs one tick: applies the key action (if any), lets the arbiter
    /// decide whether a joystick overrides the axes, and returns the
    /// finalized snapshots.
    pub fn tick(&mut self, key: Option<Key>, readings: &[DeviceReading]) -> TickOutcome {
        let mut exit = false;

        if let Some(key) = key {
            if let Some(action) = self.keymap.action_for(key) {
                debug!("Key {:?} -> {:?}", key, action);
                exit = self.apply(action);
            } else {
                debug!("Key {:?} has no binding, ignoring", key);
            }
        }

        self.arbiter.arbitrate(&mut self.state, readings);

        TickOutcome {
            command: self.state.clone(),
            render: self.render_snapshot(),
            exit,
        }
    }

    /// Dispatches one action. Returns true for the terminal exit action.
    fn apply(&mut self, action: ControlAction) -> bool {
        match action {
            ControlAction::IncreaseThrottle => {
                self.state.increase_throttle(self.settings.throttle_step)
            }
            ControlAction::DecreaseThrottle => {
                self.state.decrease_throttle(self.settings.throttle_step)
            }
            ControlAction::ResetThrottle => self.state.reset_throttle(),
            ControlAction::SteerRight => self.state.steer_right(self.settings.angle_step),
            ControlAction::SteerLeft => self.state.steer_left(self.settings.angle_step),
            ControlAction::ResetAngle => self.state.reset_angle(),
            ControlAction::PilotMode => self.state.set_mode(DriveMode::Pilot),
            ControlAction::UserMode => self.state.set_mode(DriveMode::User),
            ControlAction::ToggleRecording => self.state.toggle_recording(),
            ControlAction::ToggleHelp => self.display_help = !self.display_help,
            ControlAction::ToggleJoysticks => {
                self.arbiter.toggle();
            }
            ControlAction::Exit => {
                info!("Exit requested by operator");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::arbiter::DeviceReading;

    fn default_loop() -> ControlLoop {
        ControlLoop::new(ControlSettings::default())
    }

    fn reading(index: usize, x: f32, y: f32) -> DeviceReading {
        DeviceReading::new(index, x, y)
    }

    #[test]
    fn forward_key_saturates_throttle_exactly() {
        let mut driver = default_loop();
        for _ in 0..4 {
            driver.tick(Some(Key::ArrowUp), &[]);
        }
        assert_eq!(driver.state().throttle, 1.0);

        let outcome = driver.tick(Some(Key::ArrowUp), &[]);
        assert_eq!(outcome.command.throttle, 1.0);
    }

    #[test]
    fn pilot_key_resets_manual_axes() {
        let mut driver = default_loop();
        driver.tick(Some(Key::Char('d')), &[]);
        driver.tick(Some(Key::Char('d')), &[]);
        assert_eq!(driver.state().angle, 0.5);

        let outcome = driver.tick(Some(Key::Char('p')), &[]);
        assert_eq!(outcome.command.mode, DriveMode::Pilot);
        assert_eq!(outcome.command.angle, 0.0);
        assert_eq!(outcome.command.throttle, 0.0);
    }

    #[test]
    fn unknown_key_leaves_state_unchanged() {
        let mut driver = default_loop();
        let outcome = driver.tick(Some(Key::Char('x')), &[]);
        assert_eq!(outcome.command, ControlState::default());
        assert!(!outcome.exit);
    }

    #[test]
    fn no_key_is_a_noop() {
        let mut driver = default_loop();
        let outcome = driver.tick(None, &[]);
        assert_eq!(outcome.command, ControlState::default());
    }

    #[test]
    fn exit_key_flags_teardown_without_touching_state() {
        let mut driver = default_loop();
        let outcome = driver.tick(Some(Key::Escape), &[]);
        assert!(outcome.exit);
        assert_eq!(outcome.command, ControlState::default());
    }

    #[test]
    fn help_toggle_is_presentation_only() {
        let mut driver = default_loop();
        let outcome = driver.tick(Some(Key::Char('h')), &[]);
        assert!(outcome.render.display_help);
        assert_eq!(outcome.command, ControlState::default());

        let outcome = driver.tick(Some(Key::Char('h')), &[]);
        assert!(!outcome.render.display_help);
    }

    #[test]
    fn joystick_toggle_gates_arbitration() {
        let mut driver = default_loop();

        // Disabled in the same tick the reading arrives: keyboard stands.
        let outcome = driver.tick(Some(Key::Char('j')), &[reading(0, 0.5, -0.5)]);
        assert!(!outcome.render.joysticks_enabled);
        assert_eq!(outcome.command, ControlState::default());

        // Re-enabled: the active stick takes the axes again.
        let outcome = driver.tick(Some(Key::Char('j')), &[reading(0, 0.5, -0.5)]);
        assert!(outcome.render.joysticks_enabled);
        assert_eq!(outcome.command.angle, 0.5);
        assert_eq!(outcome.command.throttle, 0.5);
    }

    #[test]
    fn arbitration_runs_after_the_key_action() {
        let mut driver = default_loop();
        let outcome = driver.tick(Some(Key::ArrowUp), &[reading(0, 0.2, -0.8)]);
        assert_eq!(outcome.command.angle, 0.2);
        assert_eq!(outcome.command.throttle, 0.8);
    }

    #[test]
    fn record_key_toggles_flag() {
        let mut driver = default_loop();
        assert!(driver.tick(Some(Key::Char('r')), &[]).command.recording);
        assert!(!driver.tick(Some(Key::Char('r')), &[]).command.recording);
    }
}
