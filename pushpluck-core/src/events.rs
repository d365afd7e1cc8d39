// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Input event decoding
//!
//! Raw MIDI from the Push user port is parsed with the midi-msg library and
//! classified into one typed [`PushEvent`]. Classification order for
//! control changes is knob, button, time-division, grid selector, channel
//! selector; first match wins. Anything unrecognized is dropped silently,
//! by design: the Push emits plenty of traffic we don't care about.

use crate::constants::{self, ButtonCC, KnobGroup, TimeDivCC};
use crate::pos::{ChanSelPos, GridSelPos, Pos};
use midi_msg::{ChannelVoiceMsg, ControlChange, MidiMsg};
use tracing::trace;

/// A pad was struck or released (`velocity == 0` means released)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadEvent {
    pub pos: Pos,
    pub velocity: u8,
}

/// Polyphonic aftertouch on a held pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadPressureEvent {
    pub pos: Pos,
    pub pressure: u8,
}

/// A control button was pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: ButtonCC,
    pub pressed: bool,
}

/// An encoder knob ticked one detent
///
/// Push encoders send CC values 1..=63 for clockwise ticks and 65..=127
/// for counter-clockwise ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobEvent {
    pub group: KnobGroup,
    pub offset: u8,
    pub clockwise: bool,
}

/// A time-division button was pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDivEvent {
    pub time_div: TimeDivCC,
    pub pressed: bool,
}

/// A grid-selector button (above the grid) was pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSelEvent {
    pub pos: GridSelPos,
    pub pressed: bool,
}

/// A channel-selector button (below the grid) was pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChanSelEvent {
    pub pos: ChanSelPos,
    pub pressed: bool,
}

/// Any event the Push can produce that we understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushEvent {
    Pad(PadEvent),
    PadPressure(PadPressureEvent),
    Button(ButtonEvent),
    Knob(KnobEvent),
    TimeDiv(TimeDivEvent),
    GridSel(GridSelEvent),
    ChanSel(ChanSelEvent),
}

impl PushEvent {
    /// Decode one raw MIDI message into at most one event
    pub fn decode(raw: &[u8]) -> Option<PushEvent> {
        let voice_msg = match MidiMsg::from_midi(raw) {
            Ok((MidiMsg::ChannelVoice { msg, .. }, _))
            | Ok((MidiMsg::RunningChannelVoice { msg, .. }, _)) => msg,
            Ok(_) => {
                trace!(bytes = ?raw, "dropping non-voice message");
                return None;
            }
            Err(e) => {
                trace!(bytes = ?raw, error = ?e, "dropping unparseable message");
                return None;
            }
        };

        match voice_msg {
            ChannelVoiceMsg::NoteOn { note, velocity } => {
                Pos::from_input_note(note).map(|pos| PushEvent::Pad(PadEvent { pos, velocity }))
            }
            ChannelVoiceMsg::NoteOff { note, .. } => {
                Pos::from_input_note(note).map(|pos| PushEvent::Pad(PadEvent { pos, velocity: 0 }))
            }
            ChannelVoiceMsg::PolyPressure { note, pressure } => Pos::from_input_note(note)
                .map(|pos| PushEvent::PadPressure(PadPressureEvent { pos, pressure })),
            ChannelVoiceMsg::ControlChange { control } => {
                if let ControlChange::CC { control: cc, value } = control {
                    Self::decode_control(cc, value)
                } else {
                    trace!(?control, "dropping unsupported control change variant");
                    None
                }
            }
            _ => {
                trace!(?voice_msg, "dropping unsupported voice message");
                None
            }
        }
    }

    /// Classify a control change; first matching class wins
    fn decode_control(cc: u8, value: u8) -> Option<PushEvent> {
        if let Some((group, offset)) = constants::knob_from_cc(cc) {
            return Some(PushEvent::Knob(KnobEvent {
                group,
                offset,
                clockwise: value < 64,
            }));
        }
        if let Some(button) = ButtonCC::from_cc(cc) {
            return Some(PushEvent::Button(ButtonEvent {
                button,
                pressed: value > 0,
            }));
        }
        if let Some(time_div) = TimeDivCC::from_cc(cc) {
            return Some(PushEvent::TimeDiv(TimeDivEvent {
                time_div,
                pressed: value > 0,
            }));
        }
        if let Some(pos) = GridSelPos::from_input_control(cc) {
            return Some(PushEvent::GridSel(GridSelEvent {
                pos,
                pressed: value > 0,
            }));
        }
        if let Some(pos) = ChanSelPos::from_input_control(cc) {
            return Some(PushEvent::ChanSel(ChanSelEvent {
                pos,
                pressed: value > 0,
            }));
        }
        trace!(cc, value, "dropping unmapped control change");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_pad_press() {
        let event = PushEvent::decode(&[0x90, 44, 100]).unwrap();
        assert_eq!(
            event,
            PushEvent::Pad(PadEvent { pos: Pos::new(1, 0), velocity: 100 })
        );
    }

    #[test]
    fn test_decode_pad_release_via_zero_velocity() {
        let event = PushEvent::decode(&[0x90, 44, 0]).unwrap();
        assert_eq!(
            event,
            PushEvent::Pad(PadEvent { pos: Pos::new(1, 0), velocity: 0 })
        );
    }

    #[test]
    fn test_decode_pad_release_via_note_off() {
        let event = PushEvent::decode(&[0x80, 99, 64]).unwrap();
        assert_eq!(
            event,
            PushEvent::Pad(PadEvent { pos: Pos::new(7, 7), velocity: 0 })
        );
    }

    #[test]
    fn test_decode_note_outside_grid_dropped() {
        assert_eq!(PushEvent::decode(&[0x90, 35, 100]), None);
        assert_eq!(PushEvent::decode(&[0x90, 100, 100]), None);
    }

    #[test]
    fn test_decode_pad_pressure() {
        let event = PushEvent::decode(&[0xA0, 44, 80]).unwrap();
        assert_eq!(
            event,
            PushEvent::PadPressure(PadPressureEvent { pos: Pos::new(1, 0), pressure: 80 })
        );
    }

    #[rstest]
    #[case(119, 127, ButtonCC::Undo, true)]
    #[case(119, 0, ButtonCC::Undo, false)]
    #[case(110, 127, ButtonCC::Device, true)]
    #[case(58, 127, ButtonCC::Scales, true)]
    #[case(3, 127, ButtonCC::TapTempo, true)]
    fn test_decode_button(
        #[case] cc: u8,
        #[case] value: u8,
        #[case] button: ButtonCC,
        #[case] pressed: bool,
    ) {
        let event = PushEvent::decode(&[0xB0, cc, value]).unwrap();
        assert_eq!(event, PushEvent::Button(ButtonEvent { button, pressed }));
    }

    #[rstest]
    #[case(71, 1, KnobGroup::Center, 0, true)]
    #[case(71, 63, KnobGroup::Center, 0, true)]
    #[case(71, 65, KnobGroup::Center, 0, false)]
    #[case(71, 127, KnobGroup::Center, 0, false)]
    #[case(78, 2, KnobGroup::Center, 7, true)]
    #[case(14, 1, KnobGroup::Left, 0, true)]
    #[case(79, 127, KnobGroup::Right, 0, false)]
    fn test_decode_knob(
        #[case] cc: u8,
        #[case] value: u8,
        #[case] group: KnobGroup,
        #[case] offset: u8,
        #[case] clockwise: bool,
    ) {
        let event = PushEvent::decode(&[0xB0, cc, value]).unwrap();
        assert_eq!(event, PushEvent::Knob(KnobEvent { group, offset, clockwise }));
    }

    #[test]
    fn test_decode_time_div() {
        let event = PushEvent::decode(&[0xB0, 36, 127]).unwrap();
        assert_eq!(
            event,
            PushEvent::TimeDiv(TimeDivEvent { time_div: TimeDivCC::Quarter, pressed: true })
        );
    }

    #[test]
    fn test_decode_selectors() {
        let event = PushEvent::decode(&[0xB0, 20, 127]).unwrap();
        assert_eq!(
            event,
            PushEvent::ChanSel(ChanSelEvent { pos: ChanSelPos { col: 0 }, pressed: true })
        );
        let event = PushEvent::decode(&[0xB0, 109, 127]).unwrap();
        assert_eq!(
            event,
            PushEvent::GridSel(GridSelEvent { pos: GridSelPos { col: 7 }, pressed: true })
        );
    }

    #[test]
    fn test_unknown_messages_dropped() {
        // Program change, empty, garbage
        assert_eq!(PushEvent::decode(&[0xC0, 5]), None);
        assert_eq!(PushEvent::decode(&[]), None);
        assert_eq!(PushEvent::decode(&[0xF8]), None);
    }
}
