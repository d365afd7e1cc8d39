// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Runtime configuration
//!
//! [`Config`] is the single source of truth for user-facing options. It is
//! built once at startup (defaults, optionally overridden by a TOML options
//! file and CLI flags) and after that mutated only by the menu. Every other
//! component extracts the slice of config it cares about and resets itself
//! when that slice changes.

use crate::color::{Color, Palette};
use crate::error::ConfigError;
use crate::scale::{self, NoteName, Scale};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How strings map onto the pad grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Strings run left-to-right along rows (bottom row = lowest string)
    Horiz,
    /// Strings run bottom-to-top along columns
    Vert,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Horiz => "Horiz",
            Layout::Vert => "Vert",
        }
    }
}

/// Play-mode strategy applied by the fretboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Per-string choke: only the highest held fret sounds
    Tap,
    /// Every pad sounds independently
    Poly,
    /// One voice for the whole instrument
    Mono,
}

impl PlayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayMode::Tap => "Tap",
            PlayMode::Poly => "Poly",
            PlayMode::Mono => "Mono",
        }
    }
}

/// How strings map onto MIDI channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// All strings on the base channel
    Single,
    /// String i on channel base + i (strings past the window are muted)
    Multi,
}

impl ChannelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelMode::Single => "Single",
            ChannelMode::Multi => "Multi",
        }
    }
}

/// Scale classification of a note, for pad coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Root,
    Member,
    Other,
}

/// Visibility state of a string position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisState {
    /// Nothing sounding here
    #[default]
    Off,
    /// This exact position is sounding
    OnPrimary,
    /// A note-equivalent position is sounding on the same channel, so this
    /// position cannot sound
    OnDisabled,
    /// A note-equivalent position is sounding on a different channel
    OnLinked,
}

impl VisState {
    pub fn active(self) -> bool {
        self != VisState::Off
    }

    pub fn enabled(self) -> bool {
        self != VisState::OnDisabled
    }
}

/// Named palette slots for everything we draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub root_note: Color,
    pub member_note: Color,
    pub other_note: Color,
    pub primary_note: Color,
    pub disabled_note: Color,
    pub linked_note: Color,
    pub misc_pressed: Color,
    pub control: Color,
    pub control_pressed: Color,
}

impl ColorScheme {
    /// The default scheme, resolved against a palette
    pub fn default_from_palette(palette: &Palette) -> Result<ColorScheme, ConfigError> {
        Ok(ColorScheme {
            root_note: palette.require("Blue")?,
            member_note: palette.require("White")?,
            other_note: palette.require("Black")?,
            primary_note: palette.require("Green")?,
            disabled_note: palette.require("Red")?,
            linked_note: palette.require("Turquoise")?,
            misc_pressed: palette.require("Sky")?,
            control: palette.require("Yellow")?,
            control_pressed: palette.require("Green")?,
        })
    }
}

/// Decides the color of one pad from the scheme and its visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadColorMapper {
    /// A pad mapped to a playable note
    Note(NoteType),
    /// A pad with no note under it; `None` color unless pressable
    Misc { pressable: bool },
    /// A control pad (always lit)
    Control,
}

impl PadColorMapper {
    /// Resolve to a color; `None` means LED off
    pub fn get_color(&self, scheme: &ColorScheme, vis: VisState) -> Option<Color> {
        match self {
            PadColorMapper::Note(note_type) => Some(match vis {
                VisState::OnPrimary => scheme.primary_note,
                VisState::OnDisabled => scheme.disabled_note,
                VisState::OnLinked => scheme.linked_note,
                VisState::Off => match note_type {
                    NoteType::Root => scheme.root_note,
                    NoteType::Member => scheme.member_note,
                    NoteType::Other => scheme.other_note,
                },
            }),
            PadColorMapper::Misc { pressable } => {
                if vis.active() && *pressable {
                    Some(scheme.misc_pressed)
                } else {
                    None
                }
            }
            PadColorMapper::Control => Some(if vis.active() {
                scheme.control_pressed
            } else {
                scheme.control
            }),
        }
    }
}

/// A named instrument/tuning preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub instrument_name: &'static str,
    pub tuning_name: &'static str,
    /// Open-string MIDI notes, low string first
    pub tuning: &'static [u8],
}

/// All selectable instrument profiles, in menu order
pub const PROFILES: &[Profile] = &[
    Profile {
        instrument_name: "Guitar",
        tuning_name: "Standard",
        tuning: &[40, 45, 50, 55, 59, 64],
    },
    Profile {
        instrument_name: "Guitar",
        tuning_name: "DropD",
        tuning: &[38, 45, 50, 55, 59, 64],
    },
    Profile {
        instrument_name: "Bass",
        tuning_name: "Standard",
        tuning: &[28, 33, 38, 43],
    },
    Profile {
        instrument_name: "Ukulele",
        tuning_name: "Standard",
        tuning: &[67, 60, 64, 69],
    },
];

/// Look up a profile; `tuning_name` of `None` takes the instrument's first
pub fn find_profile(instrument_name: &str, tuning_name: Option<&str>) -> Option<Profile> {
    PROFILES
        .iter()
        .copied()
        .find(|p| {
            p.instrument_name == instrument_name
                && tuning_name.is_none_or(|t| p.tuning_name == t)
        })
}

/// Index of a profile in [`PROFILES`]
pub fn profile_index(profile: &Profile) -> usize {
    PROFILES
        .iter()
        .position(|p| p == profile)
        .expect("profile came from the static table")
}

/// Semitone window the fret offset may move in
pub const MIN_FRET_OFFSET: i16 = -63;
pub const MAX_FRET_OFFSET: i16 = 64;

/// String window the string offset may move in
pub const MIN_STR_OFFSET: i16 = -11;
pub const MAX_STR_OFFSET: i16 = 12;

/// The single source of truth for user-facing options
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub profile: Profile,
    pub layout: Layout,
    pub play_mode: PlayMode,
    pub chan_mode: ChannelMode,
    pub scale: Scale,
    pub root: NoteName,
    /// Nonzero incoming velocities are raised to at least this
    pub min_velocity: u8,
    pub str_offset: i16,
    pub fret_offset: i16,
}

impl Config {
    /// The startup default: standard guitar in C major, tap mode
    pub fn init(min_velocity: u8) -> Config {
        Config {
            profile: PROFILES[0],
            layout: Layout::Horiz,
            play_mode: PlayMode::Tap,
            chan_mode: ChannelMode::Single,
            scale: scale::find_scale("Major").expect("Major is in the scale table"),
            root: NoteName::C,
            min_velocity,
            str_offset: 0,
            fret_offset: 0,
        }
    }

    pub fn num_strings(&self) -> u8 {
        self.profile.tuning.len() as u8
    }

    /// Shift the fret offset, clamped to its window
    pub fn shift_fret_offset(&self, diff: i16) -> Config {
        let mut next = self.clone();
        next.fret_offset = (self.fret_offset + diff).clamp(MIN_FRET_OFFSET, MAX_FRET_OFFSET);
        next
    }

    /// Shift the string offset, clamped to its window
    pub fn shift_str_offset(&self, diff: i16) -> Config {
        let mut next = self.clone();
        next.str_offset = (self.str_offset + diff).clamp(MIN_STR_OFFSET, MAX_STR_OFFSET);
        next
    }
}

/// Startup options file (TOML)
///
/// Every field is optional; missing fields keep their defaults. This file
/// only seeds the initial [`Config`]; runtime changes stay with the menu
/// and are never written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupOptions {
    pub instrument: Option<String>,
    pub tuning: Option<String>,
    pub layout: Option<Layout>,
    pub play_mode: Option<PlayMode>,
    pub channel_mode: Option<ChannelMode>,
    pub scale: Option<String>,
    pub root: Option<String>,
    pub min_velocity: Option<u8>,
}

impl StartupOptions {
    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<StartupOptions, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply these options on top of a base config
    pub fn apply(&self, base: Config) -> Result<Config, ConfigError> {
        let mut config = base;
        if let Some(instrument) = &self.instrument {
            config.profile = find_profile(instrument, self.tuning.as_deref())
                .ok_or_else(|| ConfigError::UnknownProfile(instrument.clone()))?;
        } else if self.tuning.is_some() {
            return Err(ConfigError::Validation(
                "tuning given without instrument".to_string(),
            ));
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(play_mode) = self.play_mode {
            config.play_mode = play_mode;
        }
        if let Some(chan_mode) = self.channel_mode {
            config.chan_mode = chan_mode;
        }
        if let Some(name) = &self.scale {
            config.scale =
                scale::find_scale(name).ok_or_else(|| ConfigError::UnknownScale(name.clone()))?;
        }
        if let Some(name) = &self.root {
            config.root =
                NoteName::parse(name).ok_or_else(|| ConfigError::UnknownNote(name.clone()))?;
        }
        if let Some(min_velocity) = self.min_velocity {
            config.min_velocity = min_velocity;
        }
        Ok(config)
    }
}
