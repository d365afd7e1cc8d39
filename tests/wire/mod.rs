// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Shared test harness: tagged recording sinks for both wires

// Each test crate compiles its own copy and uses a different subset
#![allow(dead_code)]

use pushpluck::color::Palette;
use pushpluck::config::ColorScheme;
use pushpluck::error::PortError;
use pushpluck::midi::MidiSink;
use std::cell::RefCell;
use std::rc::Rc;

/// Which port a message left on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    /// To the controller (LEDs, LCD, buttons)
    Push,
    /// The processed virtual port (notes)
    Processed,
}

/// One interleaved log shared by both sinks, so cross-port ordering is
/// observable
#[derive(Clone, Default)]
pub struct WireLog(Rc<RefCell<Vec<(Wire, Vec<u8>)>>>);

impl WireLog {
    pub fn entries(&self) -> Vec<(Wire, Vec<u8>)> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Drain and return the messages sent on one wire, preserving order
    pub fn take(&self, wire: Wire) -> Vec<Vec<u8>> {
        let mut entries = self.0.borrow_mut();
        let taken = entries
            .iter()
            .filter(|(w, _)| *w == wire)
            .map(|(_, m)| m.clone())
            .collect();
        entries.retain(|(w, _)| *w != wire);
        taken
    }

    /// All text written to the LCD so far, concatenated
    pub fn lcd_text(&self) -> String {
        self.0
            .borrow()
            .iter()
            .filter(|(w, m)| {
                *w == Wire::Push
                    && m.starts_with(&[0xF0, 0x47, 0x7F, 0x15])
                    && m.len() > 8
                    && (24..=27).contains(&m[4])
            })
            .map(|(_, m)| {
                m[8..m.len() - 1]
                    .iter()
                    .map(|&b| b as char)
                    .collect::<String>()
            })
            .collect()
    }
}

/// A sink that appends everything it sends to a shared [`WireLog`]
#[derive(Clone)]
pub struct TaggedSink {
    wire: Wire,
    log: WireLog,
}

impl TaggedSink {
    pub fn new(wire: Wire, log: WireLog) -> TaggedSink {
        TaggedSink { wire, log }
    }
}

impl MidiSink for TaggedSink {
    fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError> {
        self.log.0.borrow_mut().push((self.wire, msg.to_vec()));
        Ok(())
    }
}

pub fn scheme() -> ColorScheme {
    ColorScheme::default_from_palette(&Palette::default()).unwrap()
}

/// Sounding note-ons (status 0x9n, velocity > 0) as (channel, note, vel)
pub fn note_ons(msgs: &[Vec<u8>]) -> Vec<(u8, u8, u8)> {
    msgs.iter()
        .filter(|m| m[0] & 0xF0 == 0x90 && m[2] > 0)
        .map(|m| (m[0] & 0x0F, m[1], m[2]))
        .collect()
}

/// Note-offs (status 0x8n, or 0x9n with velocity 0) as (channel, note)
pub fn note_offs(msgs: &[Vec<u8>]) -> Vec<(u8, u8)> {
    msgs.iter()
        .filter(|m| m[0] & 0xF0 == 0x80 || (m[0] & 0xF0 == 0x90 && m[2] == 0))
        .map(|m| (m[0] & 0x0F, m[1]))
        .collect()
}
