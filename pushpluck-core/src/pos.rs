// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Pad and selector coordinates
//!
//! `Pos` addresses the 8x8 grid: (0,0) is the bottom-left pad (lowest input
//! note), (7,7) the top-right. `ChanSelPos` and `GridSelPos` address the
//! single-row selector buttons below and above the grid.

use crate::constants;

/// Position on the pad grid
///
/// Bijective with the pad index `row * 8 + col` and with the input MIDI
/// note `index + 36`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub fn new(row: u8, col: u8) -> Pos {
        debug_assert!(row < constants::NUM_PAD_ROWS && col < constants::NUM_PAD_COLS);
        Pos { row, col }
    }

    /// Pad index in [0, 64)
    pub fn to_index(self) -> u8 {
        constants::NUM_PAD_COLS * self.row + self.col
    }

    /// Input MIDI note in [36, 100)
    pub fn to_note(self) -> u8 {
        constants::LOW_NOTE + self.to_index()
    }

    /// Inverse of [`Pos::to_note`]; `None` outside the pad note window
    pub fn from_input_note(note: u8) -> Option<Pos> {
        if !(constants::LOW_NOTE..constants::HIGH_NOTE).contains(&note) {
            return None;
        }
        let index = note - constants::LOW_NOTE;
        Some(Pos {
            row: index / constants::NUM_PAD_COLS,
            col: index % constants::NUM_PAD_COLS,
        })
    }

    /// Iterate all pads from lowest to highest note
    pub fn iter_all() -> impl Iterator<Item = Pos> {
        (0..constants::NUM_PAD_ROWS).flat_map(|row| {
            (0..constants::NUM_PAD_COLS).map(move |col| Pos { row, col })
        })
    }
}

/// Channel-selector button position (the row of buttons below the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChanSelPos {
    pub col: u8,
}

impl ChanSelPos {
    pub fn to_control(self) -> u8 {
        constants::LOW_CHAN_CONTROL + self.col
    }

    pub fn from_input_control(control: u8) -> Option<ChanSelPos> {
        let col = control.checked_sub(constants::LOW_CHAN_CONTROL)?;
        if col < constants::NUM_PAD_COLS {
            Some(ChanSelPos { col })
        } else {
            None
        }
    }

    pub fn iter_all() -> impl Iterator<Item = ChanSelPos> {
        (0..constants::NUM_PAD_COLS).map(|col| ChanSelPos { col })
    }
}

/// Grid-selector button position (the row of buttons above the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridSelPos {
    pub col: u8,
}

impl GridSelPos {
    pub fn to_control(self) -> u8 {
        constants::LOW_GRID_CONTROL + self.col
    }

    pub fn from_input_control(control: u8) -> Option<GridSelPos> {
        let col = control.checked_sub(constants::LOW_GRID_CONTROL)?;
        if col < constants::NUM_PAD_COLS {
            Some(GridSelPos { col })
        } else {
            None
        }
    }

    pub fn iter_all() -> impl Iterator<Item = GridSelPos> {
        (0..constants::NUM_PAD_COLS).map(|col| GridSelPos { col })
    }
}
