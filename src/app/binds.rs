use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Actions the grid view responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAction {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    /// Tear the grid down and build a fresh one
    Remount,
    Quit,
}

/// Resolved key bindings
#[derive(Debug, Default)]
pub struct KeyBinds {
    map: HashMap<(KeyModifiers, KeyCode), GridAction>,
}

impl KeyBinds {
    pub fn new(map: HashMap<(KeyModifiers, KeyCode), GridAction>) -> Self {
        Self { map }
    }

    /// Action bound to `key`, if any
    pub fn handle_key(&self, key: KeyEvent) -> Option<GridAction> {
        let (modifiers, code) = normalize(key.modifiers, key.code);
        self.map.get(&(modifiers, code)).copied()
    }

    /// Keys bound to `action`, for the status line
    pub fn keys_for(&self, action: GridAction) -> Vec<(KeyModifiers, KeyCode)> {
        let mut keys: Vec<_> = self
            .map
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_by_key(|(modifiers, code)| (modifiers.bits(), format!("{:?}", code)));
        keys
    }
}

/// Some terminals report shifted letters without the SHIFT modifier
fn normalize(modifiers: KeyModifiers, code: KeyCode) -> (KeyModifiers, KeyCode) {
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => (modifiers | KeyModifiers::SHIFT, code),
        _ => (modifiers, code),
    }
}

/// Short label for a key, e.g. "ctrl-d" or "G"
pub fn describe_key(modifiers: KeyModifiers, code: KeyCode) -> String {
    let key = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::SHIFT) => {
            return c.to_ascii_uppercase().to_string();
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdn".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    };

    let mut label = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("ctrl-");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        label.push_str("alt-");
    }
    label.push_str(&key);
    label
}
