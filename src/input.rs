use winit::keyboard::Key;

use crate::animation::AnimationState;
use crate::config::StatesConfig;

/// Keyboard shortcut table: one character per animation state.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(char, AnimationState)>,
}

impl KeyBindings {
    pub fn from_config(states: &StatesConfig) -> Self {
        let bindings = AnimationState::ALL
            .into_iter()
            .map(|state| (states.get(state).key.to_ascii_lowercase(), state))
            .collect();
        Self { bindings }
    }

    /// State bound to `c`, ignoring case.
    pub fn state_for_char(&self, c: char) -> Option<AnimationState> {
        let c = c.to_ascii_lowercase();
        self.bindings
            .iter()
            .find(|(key, _)| *key == c)
            .map(|&(_, state)| state)
    }

    /// State bound to a winit logical key, if any.
    pub fn state_for_key(&self, key: &Key) -> Option<AnimationState> {
        match key {
            Key::Character(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.state_for_char(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Help line for the overlay, e.g. `I: Idle  D: Dancing`.
    pub fn help_text(&self) -> String {
        self.bindings
            .iter()
            .map(|(key, state)| format!("{}: {}", key.to_ascii_uppercase(), state))
            .collect::<Vec<_>>()
            .join("  ")
    }
}
