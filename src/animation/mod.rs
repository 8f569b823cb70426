//! Per-state frame animation.
//!
//! [`AnimationDriver`] is the only mutable piece: a cursor (state, frame index,
//! tick timer) over a read-only [`StateTable`]. The index is always valid for
//! the active state's sequence, because it is reset to 0 on every real state
//! change and only ever advanced modulo the active sequence length.

pub mod state;
pub mod table;

use std::num::NonZeroU32;

pub use self::state::{AnimationState, STATE_COUNT};
pub use self::table::{Background, StateAssets, StateTable};

use crate::sprite::Frame;

/// Drives the character through its animation states, one tick at a time.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    table: StateTable,
    state: AnimationState,
    index: usize,
    timer: u64,
}

impl AnimationDriver {
    pub fn new(table: StateTable, initial: AnimationState) -> Self {
        Self {
            table,
            state: initial,
            index: 0,
            timer: 0,
        }
    }

    /// Change state. Re-selecting the active state is a no-op so held or
    /// repeated keys don't restart the animation.
    pub fn switch_state(&mut self, new_state: AnimationState) {
        if new_state == self.state {
            return;
        }
        log::debug!("State {} -> {}", self.state, new_state);
        self.state = new_state;
        self.index = 0;
        self.timer = 0;
    }

    /// One simulation tick.
    pub fn advance(&mut self) {
        let assets = self.table.get(self.state);
        self.timer += 1;
        if self.timer % u64::from(assets.cadence.get()) == 0 {
            self.index = (self.index + 1) % assets.frames.len();
        }
        log::trace!(
            "Tick: state={} index={} timer={}",
            self.state,
            self.index,
            self.timer
        );
    }

    pub fn current_frame(&self) -> &Frame {
        &self.table.get(self.state).frames[self.index]
    }

    pub fn current_background(&self) -> &Background {
        &self.table.get(self.state).background
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn timer(&self) -> u64 {
        self.timer
    }

    /// Ticks per frame advance in the active state.
    pub fn cadence(&self) -> NonZeroU32 {
        self.table.get(self.state).cadence
    }

    /// Number of frames in the active state's sequence.
    pub fn frame_count(&self) -> usize {
        self.table.get(self.state).frames.len()
    }
}
