// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Push 1 protocol constants
//!
//! Control-change tables for buttons, encoder knobs and time-division
//! buttons, pad-grid geometry, LCD geometry, the Ableton sysex prefix, and
//! the MIDI channel window used by multi-channel routing. These are static
//! tables; everything else in the crate looks controls up here rather than
//! hard-coding CC numbers.

use std::time::Duration;

/// Default name of the Push 1 user port
pub const DEFAULT_PUSH_PORT_NAME: &str = "Ableton Push User Port";

/// Default name of the virtual port carrying processed notes
pub const DEFAULT_PROCESSED_PORT_NAME: &str = "pushpluck";

/// Minimum delay between outbound messages to the Push so we don't flood it
pub const DEFAULT_PUSH_DELAY: Duration = Duration::from_micros(800);

/// Lowest MIDI note of the pad grid (bottom-left pad)
pub const LOW_NOTE: u8 = 36;

pub const NUM_PAD_ROWS: u8 = 8;
pub const NUM_PAD_COLS: u8 = 8;
pub const NUM_PADS: u8 = NUM_PAD_ROWS * NUM_PAD_COLS;

/// One past the highest pad note
pub const HIGH_NOTE: u8 = LOW_NOTE + NUM_PADS;

/// Manufacturer + device prefix for every Push sysex frame (47 7F 15)
pub const PUSH_SYSEX_PREFIX: [u8; 3] = [0x47, 0x7F, 0x15];

pub const DISPLAY_MAX_ROWS: u8 = 4;
pub const DISPLAY_MAX_LINE_LEN: u8 = 68;
pub const DISPLAY_BLOCK_LEN: u8 = 17;
pub const DISPLAY_MAX_BLOCKS: u8 = 4;
/// Half of a display block, one cell per encoder knob
pub const DISPLAY_HALF_BLOCK_LEN: u8 = 8;
pub const DISPLAY_MAX_HALF_BLOCKS: u8 = 8;

/// First CC of the channel-selector button row (below the grid)
pub const LOW_CHAN_CONTROL: u8 = 20;

/// First CC of the grid-selector button row (above the grid)
pub const LOW_GRID_CONTROL: u8 = 102;

/// Channel that single-channel mode routes every string to
pub const MIDI_BASE_CHANNEL: u8 = 0;
pub const MIDI_MIN_CHANNEL: u8 = 0;
/// Highest channel multi-channel mode will route a string to
pub const MIDI_MAX_CHANNEL: u8 = 5;

/// Push 1 control buttons, by CC number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ButtonCC {
    TapTempo = 3,
    Metronome = 9,
    Master = 28,
    Stop = 29,
    Left = 44,
    Right = 45,
    Up = 46,
    Down = 47,
    Select = 48,
    Shift = 49,
    Note = 50,
    Session = 51,
    AddEffect = 52,
    AddTrack = 53,
    OctaveDown = 54,
    OctaveUp = 55,
    Repeat = 56,
    Accent = 57,
    Scales = 58,
    User = 59,
    Mute = 60,
    Solo = 61,
    StepIn = 62,
    StepOut = 63,
    Play = 85,
    Rec = 86,
    New = 87,
    Duplicate = 88,
    Automation = 89,
    FixedLength = 90,
    Device = 110,
    Browse = 111,
    Track = 112,
    Clip = 113,
    Volume = 114,
    PanSend = 115,
    Quantize = 116,
    Double = 117,
    Delete = 118,
    Undo = 119,
}

impl ButtonCC {
    pub const ALL: [ButtonCC; 40] = [
        ButtonCC::TapTempo,
        ButtonCC::Metronome,
        ButtonCC::Master,
        ButtonCC::Stop,
        ButtonCC::Left,
        ButtonCC::Right,
        ButtonCC::Up,
        ButtonCC::Down,
        ButtonCC::Select,
        ButtonCC::Shift,
        ButtonCC::Note,
        ButtonCC::Session,
        ButtonCC::AddEffect,
        ButtonCC::AddTrack,
        ButtonCC::OctaveDown,
        ButtonCC::OctaveUp,
        ButtonCC::Repeat,
        ButtonCC::Accent,
        ButtonCC::Scales,
        ButtonCC::User,
        ButtonCC::Mute,
        ButtonCC::Solo,
        ButtonCC::StepIn,
        ButtonCC::StepOut,
        ButtonCC::Play,
        ButtonCC::Rec,
        ButtonCC::New,
        ButtonCC::Duplicate,
        ButtonCC::Automation,
        ButtonCC::FixedLength,
        ButtonCC::Device,
        ButtonCC::Browse,
        ButtonCC::Track,
        ButtonCC::Clip,
        ButtonCC::Volume,
        ButtonCC::PanSend,
        ButtonCC::Quantize,
        ButtonCC::Double,
        ButtonCC::Delete,
        ButtonCC::Undo,
    ];

    /// CC number of this button
    pub fn to_cc(self) -> u8 {
        self as u8
    }

    /// Look up a button by CC number
    pub fn from_cc(cc: u8) -> Option<ButtonCC> {
        Self::ALL.iter().copied().find(|b| b.to_cc() == cc)
    }
}

/// Time-division buttons (right of the grid), by CC number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TimeDivCC {
    Quarter = 36,
    QuarterTriplet = 37,
    Eighth = 38,
    EighthTriplet = 39,
    Sixteenth = 40,
    SixteenthTriplet = 41,
    ThirtySecond = 42,
    ThirtySecondTriplet = 43,
}

impl TimeDivCC {
    pub const ALL: [TimeDivCC; 8] = [
        TimeDivCC::Quarter,
        TimeDivCC::QuarterTriplet,
        TimeDivCC::Eighth,
        TimeDivCC::EighthTriplet,
        TimeDivCC::Sixteenth,
        TimeDivCC::SixteenthTriplet,
        TimeDivCC::ThirtySecond,
        TimeDivCC::ThirtySecondTriplet,
    ];

    pub fn to_cc(self) -> u8 {
        self as u8
    }

    pub fn from_cc(cc: u8) -> Option<TimeDivCC> {
        Self::ALL.iter().copied().find(|t| t.to_cc() == cc)
    }
}

/// Which bank of encoder knobs a knob CC belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobGroup {
    /// Tempo / swing knobs (CC 14, 15)
    Left,
    /// The eight knobs above the LCD (CC 71..=78)
    Center,
    /// Master knob (CC 79)
    Right,
}

/// Decompose a knob CC into its group and the offset within the group
pub fn knob_from_cc(cc: u8) -> Option<(KnobGroup, u8)> {
    match cc {
        14 | 15 => Some((KnobGroup::Left, cc - 14)),
        71..=78 => Some((KnobGroup::Center, cc - 71)),
        79 => Some((KnobGroup::Right, 0)),
        _ => None,
    }
}

/// Button LED illumination values the Push accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonIllum {
    Off = 0,
    Half = 1,
    Full = 4,
}

impl ButtonIllum {
    pub fn to_value(self) -> u8 {
        self as u8
    }
}

/// Standard guitar tuning E2 A2 D3 G3 B3 E4, low string first
pub const STANDARD_TUNING: [u8; 6] = [40, 45, 50, 55, 59, 64];
