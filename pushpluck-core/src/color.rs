// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! RGB colors and the named palette
//!
//! The palette maps human-readable names to 24-bit colors. A built-in table
//! is used by default; an optional palette file (pairs of lines, a `#RRGGBB`
//! code followed by a name) replaces it at startup.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }

    /// Render as a `#RRGGBB` code
    pub fn to_code(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Parse a `#RRGGBB` code
    pub fn from_code(code: &str) -> Option<Color> {
        let hex = code.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let red = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let green = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let blue = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color { red, green, blue })
    }
}

/// The built-in named colors
const BUILTIN_COLORS: &[(&str, &str)] = &[
    ("Black", "#000000"),
    ("DarkGrey", "#A9A9A9"),
    ("Gray", "#808080"),
    ("White", "#FFFFFF"),
    ("Red", "#FF0000"),
    ("Yellow", "#FFFF00"),
    ("Lime", "#00FF00"),
    ("Green", "#008000"),
    ("Spring", "#00FF7F"),
    ("Turquoise", "#40E0D0"),
    ("Cyan", "#00FFFF"),
    ("Sky", "#87CEEB"),
    ("Blue", "#0000FF"),
    ("Orchid", "#DA70D6"),
    ("Magenta", "#FF00FF"),
    ("Pink", "#FFC0CB"),
    ("Orange", "#FFA580"),
    ("Indigo", "#4B0082"),
    ("Violet", "#EE82EE"),
];

/// Named color palette
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<String, Color>,
}

impl Palette {
    /// Look up a color by name
    pub fn get(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Look up a color by name, erroring on a miss
    pub fn require(&self, name: &str) -> Result<Color, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownColor(name.to_string()))
    }

    /// Load a palette from a file of line pairs: `#RRGGBB` then a name
    ///
    /// Blank lines between pairs are ignored.
    pub fn load(path: &Path) -> Result<Palette, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Palette, ConfigError> {
        let mut colors = HashMap::new();
        let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
        while let Some(code_line) = lines.next() {
            let code_line = code_line.trim();
            let color = Color::from_code(code_line)
                .ok_or_else(|| ConfigError::InvalidColor(code_line.to_string()))?;
            let name = lines
                .next()
                .ok_or_else(|| ConfigError::TruncatedPalette(code_line.to_string()))?;
            colors.insert(name.trim().to_string(), color);
        }
        Ok(Palette { colors })
    }
}

impl Default for Palette {
    fn default() -> Self {
        let colors = BUILTIN_COLORS
            .iter()
            .map(|(name, code)| {
                let color = Color::from_code(code).expect("builtin color table is well formed");
                (name.to_string(), color)
            })
            .collect();
        Palette { colors }
    }
}
