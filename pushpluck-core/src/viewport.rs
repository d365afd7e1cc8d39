// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Viewport: pad grid to fretboard mapping
//!
//! Bidirectional mapping between pad positions and string positions under
//! the configured layout and string/fret offsets. Short tunings are
//! centered on the grid, so a six-string guitar occupies rows 1..=6 and
//! leaves the outer rows unmapped. Negative frets are filtered here; the
//! tuner downstream assumes positions it receives are visible.

use crate::config::{Config, Layout};
use crate::constants::{NUM_PAD_COLS, NUM_PAD_ROWS};
use crate::fretboard::{StringBounds, StringPos};
use crate::pos::Pos;

/// The slice of [`Config`] the viewport cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewportConfig {
    num_strings: u8,
    layout: Layout,
    str_offset: i16,
    fret_offset: i16,
}

impl ViewportConfig {
    fn extract(config: &Config) -> ViewportConfig {
        ViewportConfig {
            num_strings: config.num_strings(),
            layout: config.layout,
            str_offset: config.str_offset,
            fret_offset: config.fret_offset,
        }
    }
}

/// Bidirectional pad/string mapping under the current config
pub struct Viewport {
    config: ViewportConfig,
}

impl Viewport {
    pub fn new(config: &Config) -> Viewport {
        Viewport { config: ViewportConfig::extract(config) }
    }

    /// Adopt a new config; returns whether the mapping changed
    pub fn handle_config(&mut self, config: &Config) -> bool {
        let next = ViewportConfig::extract(config);
        let changed = next != self.config;
        self.config = next;
        changed
    }

    /// How many grid lines the grid can devote to strings
    fn max_str_dim(&self) -> u8 {
        match self.config.layout {
            Layout::Horiz => NUM_PAD_ROWS,
            Layout::Vert => NUM_PAD_COLS,
        }
    }

    /// The user offset adjusted to center short tunings on the grid
    fn total_str_offset(&self) -> i16 {
        let spare = self.max_str_dim().saturating_sub(self.config.num_strings) as i16;
        self.config.str_offset - spare / 2
    }

    /// Map a pad to its string position; `None` for unmapped pads
    pub fn str_pos_from_pad_pos(&self, pos: Pos) -> Option<StringPos> {
        let total = self.total_str_offset();
        let (str_index, fret) = match self.config.layout {
            Layout::Horiz => (
                pos.row as i16 + total,
                pos.col as i16 + self.config.fret_offset,
            ),
            Layout::Vert => (
                pos.col as i16 + total,
                (NUM_PAD_ROWS as i16 - 1 - pos.row as i16) + self.config.fret_offset,
            ),
        };
        if str_index < 0 || str_index >= self.config.num_strings as i16 || fret < 0 {
            return None;
        }
        Some(StringPos { str_index: str_index as u8, fret })
    }

    /// Map an input pad note to its string position
    pub fn str_pos_from_input_note(&self, note: u8) -> Option<StringPos> {
        Pos::from_input_note(note).and_then(|pos| self.str_pos_from_pad_pos(pos))
    }

    /// Map a string position back to its pad; `None` if scrolled off-grid
    pub fn pad_pos_from_str_pos(&self, sp: StringPos) -> Option<Pos> {
        let total = self.total_str_offset();
        let (row, col) = match self.config.layout {
            Layout::Horiz => (
                sp.str_index as i16 - total,
                sp.fret - self.config.fret_offset,
            ),
            Layout::Vert => (
                NUM_PAD_ROWS as i16 - 1 - (sp.fret - self.config.fret_offset),
                sp.str_index as i16 - total,
            ),
        };
        if !(0..NUM_PAD_ROWS as i16).contains(&row) || !(0..NUM_PAD_COLS as i16).contains(&col) {
            return None;
        }
        Some(Pos::new(row as u8, col as u8))
    }

    /// The rectangle of visible, valid string positions
    ///
    /// `None` when scrolling has pushed every string or fret off the grid.
    pub fn str_bounds(&self) -> Option<StringBounds> {
        let total = self.total_str_offset();
        let fret_dim = match self.config.layout {
            Layout::Horiz => NUM_PAD_COLS,
            Layout::Vert => NUM_PAD_ROWS,
        } as i16;

        let low_str = total.max(0);
        let high_str = (total + self.max_str_dim() as i16 - 1)
            .min(self.config.num_strings as i16 - 1);
        if low_str > high_str {
            return None;
        }

        let low_fret = self.config.fret_offset.max(0);
        let high_fret = self.config.fret_offset + fret_dim - 1;
        if low_fret > high_fret {
            return None;
        }

        Some(StringBounds {
            low: StringPos { str_index: low_str as u8, fret: low_fret },
            high: StringPos { str_index: high_str as u8, fret: high_fret },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROFILES;

    fn guitar() -> Viewport {
        Viewport::new(&Config::init(0))
    }

    #[test]
    fn test_horiz_centering_leaves_outer_rows_unmapped() {
        let viewport = guitar();
        for col in 0..8 {
            assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(0, col)), None);
            assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(7, col)), None);
        }
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(1, 0)),
            Some(StringPos::new(0, 0))
        );
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(6, 7)),
            Some(StringPos::new(5, 7))
        );
    }

    #[test]
    fn test_horiz_round_trip() {
        let viewport = guitar();
        for pos in Pos::iter_all() {
            if let Some(sp) = viewport.str_pos_from_pad_pos(pos) {
                assert_eq!(viewport.pad_pos_from_str_pos(sp), Some(pos));
            }
        }
    }

    #[test]
    fn test_vert_layout() {
        let mut config = Config::init(0);
        config.layout = Layout::Vert;
        let viewport = Viewport::new(&config);

        // The nut is the top row; frets grow downward
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(7, 1)),
            Some(StringPos::new(0, 0))
        );
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(0, 1)),
            Some(StringPos::new(0, 7))
        );
        // Columns 0 and 7 are unmapped for six strings
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(3, 0)), None);
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(3, 7)), None);

        for pos in Pos::iter_all() {
            if let Some(sp) = viewport.str_pos_from_pad_pos(pos) {
                assert_eq!(viewport.pad_pos_from_str_pos(sp), Some(pos));
            }
        }
    }

    #[test]
    fn test_fret_offset_scrolls() {
        let mut config = Config::init(0);
        config.fret_offset = 5;
        let viewport = Viewport::new(&config);
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(1, 0)),
            Some(StringPos::new(0, 5))
        );
        assert_eq!(
            viewport.pad_pos_from_str_pos(StringPos::new(0, 5)),
            Some(Pos::new(1, 0))
        );
        // Fret 0 has scrolled off the left edge
        assert_eq!(viewport.pad_pos_from_str_pos(StringPos::new(0, 0)), None);
    }

    #[test]
    fn test_negative_frets_filtered() {
        let mut config = Config::init(0);
        config.fret_offset = -3;
        let viewport = Viewport::new(&config);
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(1, 0)), None);
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(1, 2)), None);
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(1, 3)),
            Some(StringPos::new(0, 0))
        );
        let bounds = viewport.str_bounds().unwrap();
        assert_eq!(bounds.low.fret, 0);
        assert_eq!(bounds.high.fret, 4);
    }

    #[test]
    fn test_str_offset_scrolls() {
        let mut config = Config::init(0);
        config.str_offset = 1;
        let viewport = Viewport::new(&config);
        // Row 1 now shows string 1
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(1, 0)),
            Some(StringPos::new(1, 0))
        );
        // String 0 slides down onto the bottom row
        assert_eq!(viewport.pad_pos_from_str_pos(StringPos::new(0, 0)), Some(Pos::new(0, 0)));
    }

    #[test]
    fn test_four_string_bass_centering() {
        let mut config = Config::init(0);
        config.profile = PROFILES
            .iter()
            .copied()
            .find(|p| p.instrument_name == "Bass")
            .unwrap();
        let viewport = Viewport::new(&config);
        // (8 - 4) / 2 = 2 rows of margin at the bottom
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(1, 0)), None);
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(2, 0)),
            Some(StringPos::new(0, 0))
        );
        assert_eq!(
            viewport.str_pos_from_pad_pos(Pos::new(5, 0)),
            Some(StringPos::new(3, 0))
        );
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(6, 0)), None);
    }

    #[test]
    fn test_str_bounds_default() {
        let viewport = guitar();
        let bounds = viewport.str_bounds().unwrap();
        assert_eq!(bounds.low, StringPos::new(0, 0));
        assert_eq!(bounds.high, StringPos::new(5, 7));
        assert_eq!(bounds.iter().count(), 6 * 8);
    }

    #[test]
    fn test_str_bounds_empty_when_scrolled_away() {
        let mut config = Config::init(0);
        config.str_offset = 12;
        let viewport = Viewport::new(&config);
        assert_eq!(viewport.str_bounds(), None);
        assert_eq!(viewport.str_pos_from_pad_pos(Pos::new(4, 4)), None);
    }

    #[test]
    fn test_handle_config_reports_changes() {
        let mut viewport = guitar();
        let config = Config::init(0);
        assert!(!viewport.handle_config(&config));
        let shifted = config.shift_fret_offset(1);
        assert!(viewport.handle_config(&shifted));
        assert!(!viewport.handle_config(&shifted));
    }

    #[test]
    fn test_input_note_to_str_pos() {
        let viewport = guitar();
        // Note 44 is pad (1,0), the low E string
        assert_eq!(viewport.str_pos_from_input_note(44), Some(StringPos::new(0, 0)));
        assert_eq!(viewport.str_pos_from_input_note(36), None);
        assert_eq!(viewport.str_pos_from_input_note(127), None);
    }
}
