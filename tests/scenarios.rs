// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! End-to-end scenario tests
//!
//! Drive the orchestrator with raw MIDI exactly as the Push would send it
//! and assert on the processed-port output. Pad numbering: note 36 is the
//! bottom-left pad, note = 36 + row * 8 + col.

mod wire;

use pushpluck::config::Config;
use pushpluck::events::PushEvent;
use pushpluck::plucked::Plucked;
use wire::{TaggedSink, Wire, WireLog, note_offs, note_ons, scheme};

fn pad_note(row: u8, col: u8) -> u8 {
    36 + row * 8 + col
}

struct Rig {
    plucked: Plucked,
    log: WireLog,
}

impl Rig {
    fn new(config: Config) -> Rig {
        let log = WireLog::default();
        let mut plucked = Plucked::new(
            Box::new(TaggedSink::new(Wire::Push, log.clone())),
            Box::new(TaggedSink::new(Wire::Processed, log.clone())),
            scheme(),
            config,
        );
        plucked.startup().unwrap();
        log.clear();
        Rig { plucked, log }
    }

    fn send(&mut self, raw: &[u8]) {
        if let Some(event) = PushEvent::decode(raw) {
            self.plucked.handle_event(&event).unwrap();
        }
    }

    fn pad(&mut self, row: u8, col: u8, velocity: u8) {
        self.send(&[0x90, pad_note(row, col), velocity]);
    }

    fn processed(&self) -> Vec<Vec<u8>> {
        self.log.take(Wire::Processed)
    }
}

#[test]
fn scenario_single_pluck() {
    let mut rig = Rig::new(Config::init(0));

    // Row 0 is unmapped under the default six-string guitar
    rig.pad(0, 1, 100);
    assert!(rig.processed().is_empty());

    // Row 1 col 0 is the open low E string
    rig.pad(1, 0, 100);
    assert_eq!(rig.processed(), vec![vec![0x90, 40, 100]]);
}

#[test]
fn scenario_hammer_on_then_pull_off() {
    let mut rig = Rig::new(Config::init(0));

    rig.pad(1, 1, 90);
    assert_eq!(rig.processed(), vec![vec![0x90, 41, 90]]);

    // Hammer-on: new note's on precedes the old note's off
    rig.pad(1, 3, 95);
    assert_eq!(rig.processed(), vec![vec![0x90, 43, 95], vec![0x80, 41, 0]]);

    // Pull-off: off first, then the uncovered fret at its original velocity
    rig.pad(1, 3, 0);
    assert_eq!(rig.processed(), vec![vec![0x80, 43, 0], vec![0x90, 41, 90]]);
}

#[test]
fn scenario_lower_fret_while_higher_held() {
    let mut rig = Rig::new(Config::init(0));

    rig.pad(1, 3, 80);
    assert_eq!(rig.processed(), vec![vec![0x90, 43, 80]]);

    rig.pad(1, 1, 80);
    assert!(rig.processed().is_empty());

    rig.pad(1, 1, 0);
    assert!(rig.processed().is_empty());

    rig.pad(1, 3, 0);
    assert_eq!(rig.processed(), vec![vec![0x80, 43, 0]]);
}

#[test]
fn scenario_min_velocity_clamp() {
    let mut rig = Rig::new(Config::init(40));

    rig.pad(1, 0, 5);
    assert_eq!(rig.processed(), vec![vec![0x90, 40, 40]]);

    // Zero velocity stays a release
    rig.pad(1, 0, 0);
    assert_eq!(rig.processed(), vec![vec![0x80, 40, 0]]);
}

#[test]
fn scenario_layout_change_clears_state() {
    let mut rig = Rig::new(Config::init(0));

    rig.pad(1, 0, 100);
    assert_eq!(rig.processed(), vec![vec![0x90, 40, 100]]);
    rig.log.clear();

    // The layout knob (center knob 1, CC 72) has sensitivity 4
    for _ in 0..4 {
        rig.send(&[0xB0, 72, 1]);
    }

    // The held note was drained, and before any recoloring hit the
    // controller
    let entries = rig.log.entries();
    assert_eq!(entries[0], (Wire::Processed, vec![0x80, 40, 0]));
    assert!(
        entries[1..].iter().all(|(wire, _)| *wire == Wire::Push),
        "only controller repaint traffic after the note-off"
    );

    // Subsequent pad events use the vertical mapping: the nut of the low
    // E string is now the top row, second column
    rig.log.clear();
    rig.pad(7, 1, 100);
    assert_eq!(rig.processed(), vec![vec![0x90, 40, 100]]);
}

#[test]
fn scenario_undo_reset() {
    let mut rig = Rig::new(Config::init(0));

    // Hold frets on three strings
    rig.pad(1, 0, 100);
    rig.pad(2, 2, 100);
    rig.pad(3, 1, 100);
    // Plus a choked lower fret that must NOT produce an extra off
    rig.pad(1, 0, 0);
    rig.pad(1, 2, 100);
    rig.log.clear();

    // Flip to the Scales page so the reset has something to undo
    rig.send(&[0xB0, 58, 127]);
    rig.log.clear();

    // Undo press
    rig.send(&[0xB0, 119, 127]);

    let processed = rig.processed();
    let offs = note_offs(&processed);
    assert_eq!(offs.len(), 3);
    assert!(note_ons(&processed).is_empty());

    // The LCD is back on the Device page
    let lcd_text = rig.log.lcd_text();
    assert!(
        lcd_text.contains("[Device]"),
        "expected device page header, got: {lcd_text}"
    );
}

#[test]
fn scenario_menu_offsets_shift_the_board() {
    let mut rig = Rig::new(Config::init(0));

    // Octave up: same pad sounds 12 semitones higher
    rig.send(&[0xB0, 55, 127]);
    rig.log.clear();
    rig.pad(1, 0, 100);
    assert_eq!(rig.processed(), vec![vec![0x90, 52, 100]]);
    rig.pad(1, 0, 0);

    // Octave back down and one string up
    rig.send(&[0xB0, 54, 127]);
    rig.send(&[0xB0, 46, 127]);
    rig.log.clear();
    rig.pad(1, 0, 100);
    assert_eq!(rig.processed(), vec![vec![0x90, 45, 100]]);
}

#[test]
fn scenario_multi_channel_mode() {
    let mut rig = Rig::new(Config::init(0));

    // Channel-mode knob is center knob 3 (CC 74), sensitivity 4
    for _ in 0..4 {
        rig.send(&[0xB0, 74, 1]);
    }
    rig.log.clear();

    rig.pad(1, 0, 100);
    rig.pad(2, 0, 100);
    let processed = rig.processed();
    assert_eq!(processed[0], vec![0x90, 40, 100]);
    assert_eq!(processed[1], vec![0x91, 45, 100]);
}

#[test]
fn scenario_pad_aftertouch_follows_choke() {
    let mut rig = Rig::new(Config::init(0));

    rig.pad(1, 0, 100);
    rig.log.clear();

    // Pressure on the sounding pad is forwarded
    rig.send(&[0xA0, pad_note(1, 0), 70]);
    assert_eq!(rig.processed(), vec![vec![0xA0, 40, 70]]);

    // Pressure on a choked fret is not
    rig.pad(1, 3, 100);
    rig.log.clear();
    rig.send(&[0xA0, pad_note(1, 0), 90]);
    assert!(rig.processed().is_empty());
}

#[test]
fn scenario_unknown_traffic_is_ignored() {
    let mut rig = Rig::new(Config::init(0));

    // Program change, clock, and an unmapped CC
    rig.send(&[0xC0, 10]);
    rig.send(&[0xF8]);
    rig.send(&[0xB0, 19, 127]);

    assert!(rig.log.entries().is_empty());
}
