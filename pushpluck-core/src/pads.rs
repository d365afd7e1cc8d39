// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Pad colorizer
//!
//! Owns the fretboard and the viewport. Classifies every pad under the
//! current scale (root / member / other), overlays the fretboard's
//! visibility states (pressed, choked, linked), and routes note effects:
//! messages to the processed sink, visibility changes to the display.

use crate::config::{ColorScheme, Config, NoteType, PadColorMapper, VisState};
use crate::color::Color;
use crate::error::PortError;
use crate::events::{PadEvent, PadPressureEvent};
use crate::fretboard::{Fretboard, NoteEffects};
use crate::midi::MidiSink;
use crate::pos::Pos;
use crate::push::PushInterface;
use crate::scale::{NoteName, Scale, ScaleClassifier, name_and_octave_from_note};
use crate::viewport::Viewport;
use std::collections::BTreeMap;
use tracing::debug;

/// The slice of [`Config`] the colorizer itself cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PadsConfig {
    scale: Scale,
    root: NoteName,
}

impl PadsConfig {
    fn extract(config: &Config) -> PadsConfig {
        PadsConfig { scale: config.scale, root: config.root }
    }
}

#[derive(Debug, Clone, Copy)]
struct SinglePadState {
    mapper: PadColorMapper,
    vis: VisState,
}

impl Default for SinglePadState {
    fn default() -> Self {
        SinglePadState {
            mapper: PadColorMapper::Misc { pressable: false },
            vis: VisState::Off,
        }
    }
}

/// The pad grid: scale coloring plus fretboard state overlay
pub struct Pads {
    scheme: ColorScheme,
    config: PadsConfig,
    fretboard: Fretboard,
    viewport: Viewport,
    state: BTreeMap<Pos, SinglePadState>,
}

impl Pads {
    pub fn new(scheme: ColorScheme, config: &Config) -> Pads {
        let viewport = Viewport::new(config);
        let fretboard = Fretboard::new(viewport.str_bounds(), config);
        let mut pads = Pads {
            scheme,
            config: PadsConfig::extract(config),
            fretboard,
            viewport,
            state: Pos::iter_all().map(|pos| (pos, SinglePadState::default())).collect(),
        };
        pads.reset_pad_colors();
        pads
    }

    pub fn fretboard(&self) -> &Fretboard {
        &self.fretboard
    }

    fn pad_color(&self, pos: Pos) -> Option<Color> {
        let pad = &self.state[&pos];
        pad.mapper.get_color(&self.scheme, pad.vis)
    }

    fn redraw_pos(&self, push: &mut dyn PushInterface, pos: Pos) -> Result<(), PortError> {
        match self.pad_color(pos) {
            Some(color) => push.pad_set_color(pos, color),
            None => push.pad_led_off(pos),
        }
    }

    /// Repaint every pad (cheap: the shadow diffs it down to deltas)
    pub fn redraw(&self, push: &mut dyn PushInterface) -> Result<(), PortError> {
        for pos in Pos::iter_all() {
            self.redraw_pos(push, pos)?;
        }
        Ok(())
    }

    fn make_mapper(&self, classifier: &ScaleClassifier, pos: Pos) -> PadColorMapper {
        let Some(str_pos) = self.viewport.str_pos_from_pad_pos(pos) else {
            return PadColorMapper::Misc { pressable: false };
        };
        let Some(note) = self.fretboard.note(str_pos) else {
            return PadColorMapper::Misc { pressable: false };
        };
        let (name, _) = name_and_octave_from_note(note);
        let note_type = if classifier.is_root(name) {
            NoteType::Root
        } else if classifier.is_member(name) {
            NoteType::Member
        } else {
            NoteType::Other
        };
        PadColorMapper::Note(note_type)
    }

    /// Rebuild every pad's mapper and clear visibility overlays
    fn reset_pad_colors(&mut self) {
        let classifier = self.config.scale.to_classifier(self.config.root);
        for pos in Pos::iter_all() {
            let mapper = self.make_mapper(&classifier, pos);
            self.state.insert(pos, SinglePadState { mapper, vis: VisState::Off });
        }
    }

    /// Route note effects: messages out the sink, visibility to the display
    fn apply_effects(
        &mut self,
        push: &mut dyn PushInterface,
        sink: &mut dyn MidiSink,
        fx: NoteEffects,
    ) -> Result<(), PortError> {
        for fret_msg in &fx.msgs {
            sink.send_msg(&fret_msg.msg.to_bytes())?;
        }
        for (sp, vis) in fx.vis {
            if let Some(pad_pos) = self.viewport.pad_pos_from_str_pos(sp) {
                if let Some(pad) = self.state.get_mut(&pad_pos) {
                    pad.vis = vis;
                }
                self.redraw_pos(push, pad_pos)?;
            }
        }
        Ok(())
    }

    /// A pad was struck or released
    pub fn handle_event(
        &mut self,
        push: &mut dyn PushInterface,
        sink: &mut dyn MidiSink,
        event: &PadEvent,
    ) -> Result<(), PortError> {
        if let Some(str_pos) = self.viewport.str_pos_from_pad_pos(event.pos) {
            let fx = self.fretboard.trigger(str_pos, event.velocity);
            self.apply_effects(push, sink, fx)?;
        }
        Ok(())
    }

    /// Polyphonic aftertouch on a pad
    pub fn handle_pressure(
        &mut self,
        push: &mut dyn PushInterface,
        sink: &mut dyn MidiSink,
        event: &PadPressureEvent,
    ) -> Result<(), PortError> {
        if let Some(str_pos) = self.viewport.str_pos_from_pad_pos(event.pos) {
            let fx = self.fretboard.pressure(str_pos, event.pressure);
            self.apply_effects(push, sink, fx)?;
        }
        Ok(())
    }

    /// Adopt a new config
    ///
    /// Discipline: the fretboard drains its note-offs (under the old
    /// mapping) before anything is recolored, then mappers are rebuilt and
    /// the grid repainted.
    pub fn handle_config(
        &mut self,
        push: &mut dyn PushInterface,
        sink: &mut dyn MidiSink,
        config: &Config,
        reset: bool,
    ) -> Result<(), PortError> {
        let mut reset = reset | self.viewport.handle_config(config);
        let bounds = self.viewport.str_bounds();
        if let Some(fx) = self.fretboard.handle_config(bounds, config, reset) {
            self.apply_effects(push, sink, fx)?;
            reset = true;
        }
        let pads_config = PadsConfig::extract(config);
        if pads_config != self.config || reset {
            debug!(scale = pads_config.scale.name, root = pads_config.root.as_str(), "recoloring pads");
            self.config = pads_config;
            self.reset_pad_colors();
            self.redraw(push)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use crate::config::{Layout, PlayMode};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<Vec<u8>>>>);

    impl MidiSink for SharedSink {
        fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError> {
            self.0.borrow_mut().push(msg.to_vec());
            Ok(())
        }
    }

    /// Draw target that just counts operations
    #[derive(Default)]
    struct NullPush {
        ops: usize,
    }

    impl PushInterface for NullPush {
        fn pad_set_color(&mut self, _pos: Pos, _color: Color) -> Result<(), PortError> {
            self.ops += 1;
            Ok(())
        }

        fn pad_led_off(&mut self, _pos: Pos) -> Result<(), PortError> {
            self.ops += 1;
            Ok(())
        }

        fn lcd_display_raw(&mut self, _row: u8, _col: u8, _text: &str) -> Result<(), PortError> {
            self.ops += 1;
            Ok(())
        }

        fn button_set_illum(
            &mut self,
            _button: crate::constants::ButtonCC,
            _illum: crate::constants::ButtonIllum,
        ) -> Result<(), PortError> {
            self.ops += 1;
            Ok(())
        }

        fn button_off(&mut self, _button: crate::constants::ButtonCC) -> Result<(), PortError> {
            self.ops += 1;
            Ok(())
        }
    }

    fn scheme() -> ColorScheme {
        ColorScheme::default_from_palette(&Palette::default()).unwrap()
    }

    #[test]
    fn test_scale_coloring_default_guitar() {
        let pads = Pads::new(scheme(), &Config::init(0));
        // Row 0 is unmapped
        assert_eq!(pads.pad_color(Pos::new(0, 0)), None);
        // (1,0) is the open low E: E is a member of C major
        assert_eq!(pads.pad_color(Pos::new(1, 0)), Some(scheme().member_note));
        // (1,1) is F: also a member
        assert_eq!(pads.pad_color(Pos::new(1, 1)), Some(scheme().member_note));
        // (1,2) is F#: not in C major
        assert_eq!(pads.pad_color(Pos::new(1, 2)), Some(scheme().other_note));
        // (2,3) is open A string fret 3 = C: the root
        assert_eq!(pads.pad_color(Pos::new(2, 3)), Some(scheme().root_note));
    }

    #[test]
    fn test_pad_press_sends_note_and_recolors() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(1, 0), velocity: 100 },
        )
        .unwrap();

        assert_eq!(*sink.0.borrow(), [vec![0x90u8, 40, 100]]);
        assert_eq!(pads.pad_color(Pos::new(1, 0)), Some(scheme().primary_note));
        assert!(push.ops > 0);
    }

    #[test]
    fn test_unmapped_pad_does_nothing() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(0, 1), velocity: 100 },
        )
        .unwrap();

        assert!(sink.0.borrow().is_empty());
        assert_eq!(push.ops, 0);
    }

    #[test]
    fn test_equivalent_pad_shows_disabled() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        // (1,5) is A2, equivalent to the open A string at (2,0)
        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(1, 5), velocity: 100 },
        )
        .unwrap();

        assert_eq!(pads.pad_color(Pos::new(1, 5)), Some(scheme().primary_note));
        assert_eq!(pads.pad_color(Pos::new(2, 0)), Some(scheme().disabled_note));
    }

    #[test]
    fn test_config_change_drains_notes_before_recolor() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(1, 0), velocity: 100 },
        )
        .unwrap();
        sink.0.borrow_mut().clear();

        let mut config = Config::init(0);
        config.layout = Layout::Vert;
        pads.handle_config(&mut push, &mut sink, &config, false).unwrap();

        // The held note was released
        assert_eq!(*sink.0.borrow(), [vec![0x80u8, 40, 0]]);
        assert_eq!(pads.fretboard().tracker().held_count(), 0);

        // And subsequent events use the vertical mapping: (7,1) is the
        // open low E now
        sink.0.borrow_mut().clear();
        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(7, 1), velocity: 64 },
        )
        .unwrap();
        assert_eq!(*sink.0.borrow(), [vec![0x90u8, 40, 64]]);
    }

    #[test]
    fn test_config_change_same_config_no_reset_is_quiet() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_config(&mut push, &mut sink, &Config::init(0), false).unwrap();
        assert!(sink.0.borrow().is_empty());
        assert_eq!(push.ops, 0);
    }

    #[test]
    fn test_forced_reset_repaints() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_config(&mut push, &mut sink, &Config::init(0), true).unwrap();
        // Full repaint of the grid
        assert_eq!(push.ops, 64);
    }

    #[test]
    fn test_play_mode_change_resets_choke_state() {
        let mut pads = Pads::new(scheme(), &Config::init(0));
        let mut push = NullPush::default();
        let mut sink = SharedSink::default();

        pads.handle_event(
            &mut push,
            &mut sink,
            &PadEvent { pos: Pos::new(1, 3), velocity: 100 },
        )
        .unwrap();

        let mut config = Config::init(0);
        config.play_mode = PlayMode::Poly;
        sink.0.borrow_mut().clear();
        pads.handle_config(&mut push, &mut sink, &config, false).unwrap();
        assert_eq!(*sink.0.borrow(), [vec![0x80u8, 43, 0]]);
    }
}
