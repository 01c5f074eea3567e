//! Keyboard shortcuts and key-sequence easter eggs

use std::collections::VecDeque;

use crate::consts::{EASTER_EGG_KEYWORD, KEY_HISTORY_LEN};

/// Deck-level keyboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NextSection,
    PrevSection,
    Top,
    Bottom,
    ToggleFullscreen,
    ToggleSidebar,
    ToggleNavbar,
    ToggleHelp,
    CloseHelp,
}

impl Shortcut {
    /// Map a `KeyboardEvent.key` value. Keys typed into text inputs never map.
    pub fn from_key(key: &str, typing_in_input: bool) -> Option<Self> {
        if typing_in_input {
            return None;
        }
        let shortcut = match key {
            "ArrowDown" | "j" => Shortcut::NextSection,
            "ArrowUp" | "k" => Shortcut::PrevSection,
            "Home" => Shortcut::Top,
            "End" => Shortcut::Bottom,
            "f" | "F" => Shortcut::ToggleFullscreen,
            "m" | "M" => Shortcut::ToggleSidebar,
            "h" | "H" => Shortcut::ToggleNavbar,
            "?" => Shortcut::ToggleHelp,
            "Escape" => Shortcut::CloseHelp,
            _ => return None,
        };
        Some(shortcut)
    }

    /// Whether the browser default action should be suppressed
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Shortcut::CloseHelp)
    }

    /// Element tags whose key presses never count as shortcuts
    pub fn is_text_input_tag(tag: &str) -> bool {
        matches!(tag, "INPUT" | "TEXTAREA")
    }
}

pub const KONAMI_SEQUENCE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "KeyB",
    "KeyA",
];

/// Watches `KeyboardEvent.code` values for the Konami sequence
#[derive(Debug, Clone, Default)]
pub struct KonamiDetector {
    history: VecDeque<String>,
}

impl KonamiDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key code; true when the sequence just completed
    pub fn push(&mut self, code: &str) -> bool {
        self.history.push_back(code.to_string());
        if self.history.len() > KONAMI_SEQUENCE.len() {
            self.history.pop_front();
        }
        let matched = self.history.len() == KONAMI_SEQUENCE.len()
            && self.history.iter().zip(KONAMI_SEQUENCE).all(|(a, b)| a == b);
        if matched {
            self.history.clear();
        }
        matched
    }
}

/// Watches typed characters for a keyword
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    keyword: String,
    typed: VecDeque<char>,
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new(EASTER_EGG_KEYWORD)
    }
}

impl KeywordDetector {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            typed: VecDeque::with_capacity(KEY_HISTORY_LEN),
        }
    }

    /// Feed one `KeyboardEvent.key`; named keys (Shift, Enter, ...) are ignored
    pub fn push(&mut self, key: &str) -> bool {
        let mut chars = key.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return false;
        };
        self.typed.extend(c.to_lowercase());
        while self.typed.len() > KEY_HISTORY_LEN {
            self.typed.pop_front();
        }
        let buffer: String = self.typed.iter().collect();
        if buffer.contains(&self.keyword) {
            self.typed.clear();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_mapping() {
        assert_eq!(Shortcut::from_key("j", false), Some(Shortcut::NextSection));
        assert_eq!(Shortcut::from_key("ArrowUp", false), Some(Shortcut::PrevSection));
        assert_eq!(Shortcut::from_key("End", false), Some(Shortcut::Bottom));
        assert_eq!(Shortcut::from_key("?", false), Some(Shortcut::ToggleHelp));
        assert_eq!(Shortcut::from_key("x", false), None);
        assert_eq!(Shortcut::from_key("j", true), None);
        assert!(!Shortcut::CloseHelp.prevents_default());
        assert!(Shortcut::is_text_input_tag("TEXTAREA"));
    }

    #[test]
    fn test_konami() {
        let mut det = KonamiDetector::new();
        // Noise before the sequence is fine
        assert!(!det.push("KeyX"));
        let fired: Vec<bool> = KONAMI_SEQUENCE.iter().map(|c| det.push(c)).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 1);
        assert!(fired[9]);
        // Reset after firing
        assert!(!det.push("KeyA"));
    }

    #[test]
    fn test_konami_broken_sequence() {
        let mut det = KonamiDetector::new();
        for code in &KONAMI_SEQUENCE[..9] {
            det.push(code);
        }
        assert!(!det.push("KeyC"));
    }

    #[test]
    fn test_keyword() {
        let mut det = KeywordDetector::default();
        let mut fired = false;
        for key in ["Shift", "R", "i", "z", "t", "a"] {
            fired = det.push(key);
        }
        assert!(fired);
        assert!(!det.push("a"));
    }

    #[test]
    fn test_keyword_window() {
        let mut det = KeywordDetector::new("ab");
        for _ in 0..20 {
            assert!(!det.push("x"));
        }
        assert!(!det.push("a"));
        assert!(det.push("b"));
    }
}
