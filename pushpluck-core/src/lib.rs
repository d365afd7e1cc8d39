// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Pushpluck Core Engine
//!
//! Pure Rust engine that plays an Ableton Push 1 as a polyphonic fretted
//! string instrument, with zero UI dependencies.
//!
//! This library consumes raw MIDI from the controller's user port,
//! interprets the pad grid as strings and frets, simulates per-string
//! choke behavior (only the highest held fret sounds, with hammer-on and
//! pull-off transitions), and emits processed note events on a virtual
//! output port. It simultaneously drives the controller's pad LEDs, LCD
//! and button lights to reflect scale membership, pressed notes and menu
//! state.
//!
//! # Architecture
//!
//! The processing pipeline per incoming message:
//!
//! 1. **Decode**: [`PushEvent::decode`] turns raw MIDI into a typed event
//! 2. **Route**: [`Plucked`] hands pads to the fretboard path and
//!    everything else to the menu
//! 3. **Engine**: the fretboard resolves notes, clamps velocities and
//!    applies the play-mode state machine, returning `NoteEffects`
//! 4. **Display**: all drawing goes through the [`shadow`] diff driver,
//!    so only deltas reach the wire (rate-limited in [`midi`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pushpluck_core::{
//!     ColorScheme, Config, Palette, Plucked, PushEvent, PushPorts,
//!     constants,
//! };
//!
//! let ports = PushPorts::open(
//!     constants::DEFAULT_PUSH_PORT_NAME,
//!     constants::DEFAULT_PROCESSED_PORT_NAME,
//!     constants::DEFAULT_PUSH_DELAY,
//! )?;
//! let palette = Palette::default();
//! let scheme = ColorScheme::default_from_palette(&palette)?;
//! let mut plucked = Plucked::new(
//!     Box::new(ports.midi_out),
//!     Box::new(ports.midi_processed),
//!     scheme,
//!     Config::init(0),
//! );
//! plucked.reset()?;
//! // In your event loop:
//! // while let Some(raw) = ports.midi_in.recv_timeout(timeout)? {
//! //     if let Some(event) = PushEvent::decode(&raw) {
//! //         plucked.handle_event(&event)?;
//! //     }
//! // }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(missing_docs)]

// Public modules
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fretboard;
pub mod menu;
pub mod midi;
pub mod pads;
pub mod plucked;
pub mod pos;
pub mod push;
pub mod scale;
pub mod shadow;
pub mod viewport;

// Re-exports for convenience

// Orchestrator
pub use plucked::Plucked;

// Configuration
pub use config::{ChannelMode, ColorScheme, Config, Layout, PlayMode, StartupOptions, VisState};

// Colors
pub use color::{Color, Palette};

// Events
pub use events::{PadEvent, PushEvent};

// Engine
pub use fretboard::{Fretboard, NoteEffects, StringBounds, StringPos};
pub use viewport::Viewport;
pub use pads::Pads;
pub use menu::{Menu, Page};

// MIDI I/O
pub use midi::{ChannelMessage, MidiInputQueue, MidiSink, PushPorts, RateLimitedSink, VirtualSink};

// Push protocol
pub use push::{PushInterface, PushOutput};
pub use shadow::PushShadow;

// Errors
pub use error::{ConfigError, PortError};
