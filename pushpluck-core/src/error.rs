// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// MIDI port errors
///
/// These are fatal: the daemon surfaces them to the user and exits nonzero.
/// Malformed *messages* are not errors (the decoder drops them silently).
#[derive(Debug, Error)]
pub enum PortError {
    #[error("MIDI initialization failed: {0}")]
    Init(String),

    #[error("MIDI port not found: {0}")]
    NotFound(String),

    #[error("MIDI connection failed: {0}")]
    ConnectionFailed(String),

    #[error("MIDI send failed on {port}: {message}")]
    SendFailed { port: String, message: String },

    #[error("MIDI input disconnected: {0}")]
    Disconnected(String),
}

/// Configuration and palette file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid color code: {0}")]
    InvalidColor(String),

    #[error("Palette file truncated: color {0} has no name line")]
    TruncatedPalette(String),

    #[error("Unknown color name: {0}")]
    UnknownColor(String),

    #[error("Unknown scale: {0}")]
    UnknownScale(String),

    #[error("Unknown note name: {0}")]
    UnknownNote(String),

    #[error("Unknown instrument profile: {0}")]
    UnknownProfile(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
