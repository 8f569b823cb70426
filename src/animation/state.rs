use serde::{Deserialize, Serialize};

/// Visual state of the character. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AnimationState {
    Idle = 0,
    Dancing = 1,
    Jumping = 2,
    Sleeping = 3,
    Celebrating = 4,
}

/// Number of variants; sizes every per-state table.
pub const STATE_COUNT: usize = 5;

impl AnimationState {
    pub const ALL: [AnimationState; STATE_COUNT] = [
        Self::Idle,
        Self::Dancing,
        Self::Jumping,
        Self::Sleeping,
        Self::Celebrating,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Dancing => "Dancing",
            Self::Jumping => "Jumping",
            Self::Sleeping => "Sleeping",
            Self::Celebrating => "Celebrating",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(name))
    }

    /// Slot in per-state arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for AnimationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, state) in AnimationState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
    }

    #[test]
    fn from_name_ignores_case() {
        assert_eq!(AnimationState::from_name("sleeping"), Some(AnimationState::Sleeping));
        assert_eq!(AnimationState::from_name("JUMPING"), Some(AnimationState::Jumping));
        assert_eq!(AnimationState::from_name("walking"), None);
    }

    #[test]
    fn deserializes_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            state: AnimationState,
        }
        let w: Wrapper = toml::from_str("state = \"celebrating\"").unwrap();
        assert_eq!(w.state, AnimationState::Celebrating);
        assert!(toml::from_str::<Wrapper>("state = \"moonwalking\"").is_err());
    }
}
