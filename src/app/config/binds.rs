use crate::app::binds::GridAction;
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BindsConfig {
    #[serde(default = "BindsConfig::default_scroll_up")]
    pub scroll_up: Vec<String>,
    #[serde(default = "BindsConfig::default_scroll_down")]
    pub scroll_down: Vec<String>,
    #[serde(default = "BindsConfig::default_page_up")]
    pub page_up: Vec<String>,
    #[serde(default = "BindsConfig::default_page_down")]
    pub page_down: Vec<String>,
    #[serde(default = "BindsConfig::default_go_to_top")]
    pub go_to_top: Vec<String>,
    #[serde(default = "BindsConfig::default_go_to_bottom")]
    pub go_to_bottom: Vec<String>,
    #[serde(default = "BindsConfig::default_remount")]
    pub remount: Vec<String>,
    #[serde(default = "BindsConfig::default_quit")]
    pub quit: Vec<String>,
}

impl BindsConfig {
    fn default_scroll_up() -> Vec<String> {
        vec!["k".to_string(), "up".to_string()]
    }
    fn default_scroll_down() -> Vec<String> {
        vec!["j".to_string(), "down".to_string()]
    }
    fn default_page_up() -> Vec<String> {
        vec!["ctrl-u".to_string(), "pageup".to_string()]
    }
    fn default_page_down() -> Vec<String> {
        vec!["ctrl-d".to_string(), "pagedown".to_string()]
    }
    fn default_go_to_top() -> Vec<String> {
        vec!["g".to_string(), "home".to_string()]
    }
    fn default_go_to_bottom() -> Vec<String> {
        vec!["shift-g".to_string(), "end".to_string()]
    }
    fn default_remount() -> Vec<String> {
        vec!["r".to_string()]
    }
    fn default_quit() -> Vec<String> {
        vec!["q".to_string(), "esc".to_string(), "ctrl-c".to_string()]
    }

    pub fn parse_keybinding(key_str: &str) -> Option<(KeyModifiers, KeyCode)> {
        let key_str = key_str.trim().to_lowercase();

        // Standalone "-" would otherwise split into nothing
        if key_str == "-" {
            return Some((KeyModifiers::NONE, KeyCode::Char('-')));
        }

        let parts: Vec<&str> = key_str.split('-').collect();
        let (key_part, modifier_parts) = parts.split_last()?;

        let mut modifiers = KeyModifiers::NONE;
        for part in modifier_parts {
            match *part {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match *key_part {
            "esc" => KeyCode::Esc,
            "enter" => KeyCode::Enter,
            "backspace" => KeyCode::Backspace,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "space" => KeyCode::Char(' '),
            c if c.chars().count() == 1 => {
                let ch = c.chars().next()?;
                // Terminals report shifted letters as uppercase
                if modifiers.contains(KeyModifiers::SHIFT) {
                    KeyCode::Char(ch.to_ascii_uppercase())
                } else {
                    KeyCode::Char(ch)
                }
            }
            _ => return None,
        };

        Some((modifiers, code))
    }

    /// Build the key -> action map. Unparseable bindings are skipped and
    /// returned as warnings.
    pub fn build_key_map(&self) -> (HashMap<(KeyModifiers, KeyCode), GridAction>, Vec<String>) {
        let mut map = HashMap::new();
        let mut warnings = Vec::new();

        let actions: [(&Vec<String>, GridAction); 8] = [
            (&self.scroll_up, GridAction::ScrollUp),
            (&self.scroll_down, GridAction::ScrollDown),
            (&self.page_up, GridAction::PageUp),
            (&self.page_down, GridAction::PageDown),
            (&self.go_to_top, GridAction::GoToTop),
            (&self.go_to_bottom, GridAction::GoToBottom),
            (&self.remount, GridAction::Remount),
            (&self.quit, GridAction::Quit),
        ];

        for (bindings, action) in actions {
            for binding in bindings {
                match Self::parse_keybinding(binding) {
                    Some(key) => {
                        map.insert(key, action);
                    }
                    None => warnings.push(format!("Invalid key binding for {:?}: {}", action, binding)),
                }
            }
        }

        (map, warnings)
    }
}

impl Default for BindsConfig {
    fn default() -> Self {
        Self {
            scroll_up: Self::default_scroll_up(),
            scroll_down: Self::default_scroll_down(),
            page_up: Self::default_page_up(),
            page_down: Self::default_page_down(),
            go_to_top: Self::default_go_to_top(),
            go_to_bottom: Self::default_go_to_bottom(),
            remount: Self::default_remount(),
            quit: Self::default_quit(),
        }
    }
}
