// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Note names, scales, and the scale classifier
//!
//! A [`Scale`] is a root-relative interval pattern; combined with a root
//! [`NoteName`] it yields a [`ScaleClassifier`] that decides whether a pitch
//! is the root, a member of the scale, or neither. The classifier drives pad
//! coloring.

use serde::{Deserialize, Serialize};

pub const MAX_NOTES: u8 = 12;

/// The twelve pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NoteName {
    C = 0,
    Cs = 1,
    D = 2,
    Ds = 3,
    E = 4,
    F = 5,
    Fs = 6,
    G = 7,
    Gs = 8,
    A = 9,
    As = 10,
    B = 11,
}

impl NoteName {
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::Cs,
        NoteName::D,
        NoteName::Ds,
        NoteName::E,
        NoteName::F,
        NoteName::Fs,
        NoteName::G,
        NoteName::Gs,
        NoteName::A,
        NoteName::As,
        NoteName::B,
    ];

    /// Pitch-class offset in [0, 12)
    pub fn offset(self) -> u8 {
        self as u8
    }

    /// Note name for a pitch-class offset (wraps mod 12)
    pub fn from_offset(offset: u8) -> NoteName {
        Self::ALL[(offset % MAX_NOTES) as usize]
    }

    /// Display name with sharps
    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::B => "B",
        }
    }

    /// Parse a display name ("C#", "Bb" is not supported, sharps only)
    pub fn parse(name: &str) -> Option<NoteName> {
        Self::ALL.iter().copied().find(|n| n.as_str() == name)
    }
}

/// Name and octave of a MIDI note (C-2 is note 0, middle C is C3)
pub fn name_and_octave_from_note(note: u8) -> (NoteName, i8) {
    let name = NoteName::from_offset(note % MAX_NOTES);
    let octave = (note / MAX_NOTES) as i8 - 2;
    (name, octave)
}

/// Scale step sizes in semitones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Step {
    Half = 1,
    Whole = 2,
    AugSecond = 3,
}

impl Step {
    pub fn semitones(self) -> u8 {
        self as u8
    }
}

use Step::{AugSecond, Half, Whole};

/// A scale as a root-relative interval pattern
///
/// The intervals must sum to one octave; [`Scale::to_classifier`] checks
/// this and panics on a malformed table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub name: &'static str,
    intervals: &'static [Step],
}

/// All selectable scales, in menu order
pub const SCALES: &[Scale] = &[
    Scale { name: "Major", intervals: &[Whole, Whole, Half, Whole, Whole, Whole, Half] },
    Scale { name: "Minor", intervals: &[Whole, Half, Whole, Whole, Half, Whole, Whole] },
    Scale { name: "Dorian", intervals: &[Whole, Half, Whole, Whole, Whole, Half, Whole] },
    Scale { name: "Phrygian", intervals: &[Half, Whole, Whole, Whole, Half, Whole, Whole] },
    Scale { name: "Lydian", intervals: &[Whole, Whole, Whole, Half, Whole, Whole, Half] },
    Scale { name: "Mixolydian", intervals: &[Whole, Whole, Half, Whole, Whole, Half, Whole] },
    Scale { name: "Locrian", intervals: &[Half, Whole, Whole, Half, Whole, Whole, Whole] },
    Scale { name: "MajorPentatonic", intervals: &[Whole, Whole, AugSecond, Whole, AugSecond] },
    Scale { name: "MinorPentatonic", intervals: &[AugSecond, Whole, Whole, AugSecond, Whole] },
    Scale {
        name: "Blues",
        intervals: &[AugSecond, Whole, Half, Half, AugSecond, Whole],
    },
    Scale {
        name: "HarmonicMinor",
        intervals: &[Whole, Half, Whole, Whole, Half, AugSecond, Half],
    },
    Scale {
        name: "Chromatic",
        intervals: &[
            Half, Half, Half, Half, Half, Half, Half, Half, Half, Half, Half, Half,
        ],
    },
];

/// Look up a scale by name
pub fn find_scale(name: &str) -> Option<Scale> {
    SCALES.iter().copied().find(|s| s.name == name)
}

/// Index of a scale in [`SCALES`]
pub fn scale_index(scale: Scale) -> usize {
    SCALES
        .iter()
        .position(|s| s.name == scale.name)
        .expect("scale came from the static table")
}

impl Scale {
    /// Build the membership classifier for this scale rooted at `root`
    pub fn to_classifier(self, root: NoteName) -> ScaleClassifier {
        let total: u8 = self.intervals.iter().map(|s| s.semitones()).sum();
        assert_eq!(total, MAX_NOTES, "scale {} does not span one octave", self.name);
        let mut members = [false; 12];
        let mut offset = root.offset();
        for step in self.intervals {
            members[(offset % MAX_NOTES) as usize] = true;
            offset += step.semitones();
        }
        ScaleClassifier { root, members }
    }
}

/// Decides whether a note name is the scale root, a member, or neither
#[derive(Debug, Clone, Copy)]
pub struct ScaleClassifier {
    root: NoteName,
    members: [bool; 12],
}

impl ScaleClassifier {
    pub fn is_root(&self, name: NoteName) -> bool {
        self.root == name
    }

    pub fn is_member(&self, name: NoteName) -> bool {
        self.members[name.offset() as usize]
    }
}
