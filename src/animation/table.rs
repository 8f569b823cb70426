use std::num::NonZeroU32;

use super::state::AnimationState;
use crate::sprite::{FrameSequence, ImageHandle};

/// What fills the window behind the character.
#[derive(Debug, Clone)]
pub enum Background {
    /// Flat RGB clear color.
    Fill([u8; 3]),
    /// Image stretched over the whole window.
    Image(ImageHandle),
}

/// Everything one state needs to animate and draw.
#[derive(Debug, Clone)]
pub struct StateAssets {
    pub frames: FrameSequence,
    pub background: Background,
    /// Ticks between frame advances.
    pub cadence: NonZeroU32,
}

/// One [`StateAssets`] per [`AnimationState`], fixed at startup.
/// `entries[i]` belongs to `AnimationState::ALL[i]`.
#[derive(Debug, Clone)]
pub struct StateTable {
    entries: Box<[StateAssets]>,
}

impl StateTable {
    /// Build the table from a per-state constructor. Called once per variant,
    /// in [`AnimationState::ALL`] order.
    pub fn from_fn<E>(
        mut build: impl FnMut(AnimationState) -> Result<StateAssets, E>,
    ) -> Result<Self, E> {
        let entries = AnimationState::ALL
            .into_iter()
            .map(&mut build)
            .collect::<Result<Box<[_]>, E>>()?;
        Ok(Self { entries })
    }

    pub fn get(&self, state: AnimationState) -> &StateAssets {
        &self.entries[state.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimationState, &StateAssets)> {
        AnimationState::ALL.into_iter().zip(self.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::test_table;

    #[test]
    fn one_entry_per_state_in_declaration_order() {
        let table = test_table([1, 2, 3, 4, 5]);
        let states: Vec<_> = table.iter().map(|(state, _)| state).collect();
        assert_eq!(states, AnimationState::ALL.to_vec());
        for state in AnimationState::ALL {
            assert_eq!(table.get(state).cadence.get() as usize, state.index() + 1);
        }
    }

    #[test]
    fn first_build_error_stops_construction() {
        let mut calls = Vec::new();
        let result: Result<StateTable, AnimationState> = StateTable::from_fn(|state| {
            calls.push(state);
            Err(state)
        });
        assert_eq!(result.unwrap_err(), AnimationState::Idle);
        assert_eq!(calls, vec![AnimationState::Idle]);
    }
}
