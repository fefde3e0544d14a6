//! Static mapping from normalized key identifiers to control actions.

use std::collections::HashMap;

use crate::input::keys::Key;

/// Everything a single key press can do to the session. Axis and mode
/// actions mutate [`crate::control::ControlState`]; the last three are meta
/// actions handled by the control loop itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    IncreaseThrottle,
    DecreaseThrottle,
    ResetThrottle,
    SteerRight,
    SteerLeft,
    ResetAngle,
    PilotMode,
    UserMode,
    ToggleRecording,
    ToggleHelp,
    ToggleJoysticks,
    Exit,
}

/// The key table. Built once at session start, never mutated afterwards.
pub struct KeyMap {
    bindings: HashMap<Key, ControlAction>,
}

impl KeyMap {
    /// The default binding set: arrows plus the ZQSD cluster for driving,
    /// single letters for mode and toggle actions.
    pub fn default_config() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Key::Escape, ControlAction::Exit);
        bindings.insert(Key::ArrowUp, ControlAction::IncreaseThrottle);
        bindings.insert(Key::Char('Z'), ControlAction::IncreaseThrottle);
        bindings.insert(Key::ArrowDown, ControlAction::DecreaseThrottle);
        bindings.insert(Key::Char('S'), ControlAction::DecreaseThrottle);
        bindings.insert(Key::Space, ControlAction::ResetThrottle);
        bindings.insert(Key::ArrowRight, ControlAction::SteerRight);
        bindings.insert(Key::Char('D'), ControlAction::SteerRight);
        bindings.insert(Key::ArrowLeft, ControlAction::SteerLeft);
        bindings.insert(Key::Char('Q'), ControlAction::SteerLeft);
        bindings.insert(Key::Tab, ControlAction::ResetAngle);
        bindings.insert(Key::Char('P'), ControlAction::PilotMode);
        bindings.insert(Key::Char('U'), ControlAction::UserMode);
        bindings.insert(Key::Char('H'), ControlAction::ToggleHelp);
        bindings.insert(Key::Char('J'), ControlAction::ToggleJoysticks);
        bindings.insert(Key::Char('R'), ControlAction::ToggleRecording);

        KeyMap { bindings }
    }

    /// Total lookup: case-folds the key first, keys without a binding
    /// return `None` and the tick becomes a no-op on state.
    pub fn action_for(&self, key: Key) -> Option<ControlAction> {
        self.bindings.get(&key.normalized()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_for_unbound_keys() {
        let keymap = KeyMap::default_config();
        assert_eq!(keymap.action_for(Key::Char('X')), None);
        assert_eq!(keymap.action_for(Key::Char('0')), None);
    }

    #[test]
    fn lookup_case_folds() {
        let keymap = KeyMap::default_config();
        assert_eq!(
            keymap.action_for(Key::Char('z')),
            Some(ControlAction::IncreaseThrottle)
        );
        assert_eq!(
            keymap.action_for(Key::Char('Z')),
            Some(ControlAction::IncreaseThrottle)
        );
    }

    #[test]
    fn arrows_and_letters_share_actions() {
        let keymap = KeyMap::default_config();
        assert_eq!(
            keymap.action_for(Key::ArrowDown),
            keymap.action_for(Key::Char('S'))
        );
        assert_eq!(
            keymap.action_for(Key::ArrowLeft),
            keymap.action_for(Key::Char('Q'))
        );
    }

    #[test]
    fn escape_maps_to_exit() {
        let keymap = KeyMap::default_config();
        assert_eq!(keymap.action_for(Key::Escape), Some(ControlAction::Exit));
    }
}
