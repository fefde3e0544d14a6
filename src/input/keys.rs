//! Normalized key identifier space shared by the UI and the key table.

use eframe::egui;

/// One operator key press, reduced to the identifier space the key table is
/// built over. Printable keys are case-folded to uppercase; the handful of
/// non-printable keys the table binds get named variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Tab,
    Space,
}

impl Key {
    /// Case-folds printable keys so that 'z' and 'Z' hit the same binding.
    pub fn normalized(self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_uppercase()),
            other => other,
        }
    }
}

/// Converts an egui key event into the normalized identifier space.
///
/// Keys with no counterpart (function keys, media keys, ...) convert to
/// `None` and end up as no-ops downstream.
pub fn from_egui(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::ArrowUp => Some(Key::ArrowUp),
        egui::Key::ArrowDown => Some(Key::ArrowDown),
        egui::Key::ArrowLeft => Some(Key::ArrowLeft),
        egui::Key::ArrowRight => Some(Key::ArrowRight),
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::Tab => Some(Key::Tab),
        egui::Key::Space => Some(Key::Space),
        other => {
            let name = other.name();
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    Some(Key::Char(c.to_ascii_uppercase()))
                }
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_keys_convert_to_named_variants() {
        assert_eq!(from_egui(egui::Key::ArrowUp), Some(Key::ArrowUp));
        assert_eq!(from_egui(egui::Key::ArrowDown), Some(Key::ArrowDown));
        assert_eq!(from_egui(egui::Key::ArrowLeft), Some(Key::ArrowLeft));
        assert_eq!(from_egui(egui::Key::ArrowRight), Some(Key::ArrowRight));
        assert_eq!(from_egui(egui::Key::Escape), Some(Key::Escape));
        assert_eq!(from_egui(egui::Key::Tab), Some(Key::Tab));
        assert_eq!(from_egui(egui::Key::Space), Some(Key::Space));
    }

    #[test]
    fn letter_keys_convert_to_uppercase_chars() {
        assert_eq!(from_egui(egui::Key::Z), Some(Key::Char('Z')));
        assert_eq!(from_egui(egui::Key::H), Some(Key::Char('H')));
    }

    #[test]
    fn unmapped_keys_convert_to_none() {
        assert_eq!(from_egui(egui::Key::F5), None);
        assert_eq!(from_egui(egui::Key::Home), None);
    }

    #[test]
    fn normalization_case_folds_chars_only() {
        assert_eq!(Key::Char('q').normalized(), Key::Char('Q'));
        assert_eq!(Key::Char('Q').normalized(), Key::Char('Q'));
        assert_eq!(Key::Tab.normalized(), Key::Tab);
    }
}
