// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Fretboard engine
//!
//! Turns string positions and velocities into MIDI notes. The moving parts:
//!
//! - [`FixedTuner`]: note and note-group lookup over the viewport's current
//!   string bounds
//! - [`ChannelMapper`]: string index to MIDI channel, per channel mode
//! - [`NoteHandler`]: the play-mode strategy (per-string choke for tap
//!   mode, mono legato, or plain polyphony)
//! - [`NoteTracker`]: which notes are sounding on which channel, and the
//!   per-position visibility states that drive pad coloring
//!
//! Every operation returns [`NoteEffects`]: an ordered list of outbound
//! messages plus visibility updates. The caller routes them; the engine
//! holds no port handles and never draws.

use crate::config::{ChannelMode, Config, PlayMode, VisState};
use crate::constants::{MIDI_BASE_CHANNEL, MIDI_MAX_CHANNEL};
use crate::midi::ChannelMessage;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// A fretted position: string index and signed semitone offset from the
/// open string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringPos {
    pub str_index: u8,
    pub fret: i16,
}

impl StringPos {
    pub fn new(str_index: u8, fret: i16) -> StringPos {
        StringPos { str_index, fret }
    }
}

/// Inclusive rectangle of string positions currently exposed by the
/// viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringBounds {
    pub low: StringPos,
    pub high: StringPos,
}

impl StringBounds {
    /// Iterate positions string-major, low to high
    pub fn iter(&self) -> impl Iterator<Item = StringPos> + '_ {
        (self.low.str_index..=self.high.str_index).flat_map(move |str_index| {
            (self.low.fret..=self.high.fret).map(move |fret| StringPos { str_index, fret })
        })
    }

    pub fn contains(&self, sp: StringPos) -> bool {
        (self.low.str_index..=self.high.str_index).contains(&sp.str_index)
            && (self.low.fret..=self.high.fret).contains(&sp.fret)
    }
}

/// A message leaving the fretboard, tagged with where it came from and
/// which other positions produce the same note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FretboardMessage {
    pub str_pos: StringPos,
    /// Note-equivalent positions elsewhere on the fretboard
    pub equivs: Vec<StringPos>,
    pub msg: ChannelMessage,
}

/// What a fretboard operation wants the caller to do: send these messages
/// (in order) and update these pad visibility states
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEffects {
    pub vis: BTreeMap<StringPos, VisState>,
    pub msgs: Vec<FretboardMessage>,
}

impl NoteEffects {
    pub fn is_empty(&self) -> bool {
        self.vis.is_empty() && self.msgs.is_empty()
    }
}

/// The slice of [`Config`] the fretboard cares about
#[derive(Debug, Clone, PartialEq)]
struct FretboardConfig {
    tuning: Vec<u8>,
    min_velocity: u8,
    play_mode: PlayMode,
    chan_mode: ChannelMode,
}

impl FretboardConfig {
    fn extract(config: &Config) -> FretboardConfig {
        FretboardConfig {
            tuning: config.profile.tuning.to_vec(),
            min_velocity: config.min_velocity,
            play_mode: config.play_mode,
            chan_mode: config.chan_mode,
        }
    }
}

/// Note and note-group lookup over a fixed set of bounds
///
/// Built by iterating the current bounds once; positions whose note would
/// fall outside the MIDI range are simply absent.
pub struct FixedTuner {
    note_lookup: BTreeMap<StringPos, u8>,
    equivs_lookup: HashMap<u8, Vec<StringPos>>,
}

impl FixedTuner {
    fn new(tuning: &[u8], bounds: Option<&StringBounds>) -> FixedTuner {
        let mut note_lookup = BTreeMap::new();
        let mut equivs_lookup: HashMap<u8, Vec<StringPos>> = HashMap::new();
        if let Some(bounds) = bounds {
            for sp in bounds.iter() {
                let Some(&open) = tuning.get(sp.str_index as usize) else {
                    continue;
                };
                let note = open as i16 + sp.fret;
                if let Ok(note) = u8::try_from(note)
                    && note <= 127
                {
                    note_lookup.insert(sp, note);
                    equivs_lookup.entry(note).or_default().push(sp);
                }
            }
        }
        FixedTuner { note_lookup, equivs_lookup }
    }

    /// The MIDI note at a position, if it is inside bounds and range
    pub fn note(&self, sp: StringPos) -> Option<u8> {
        self.note_lookup.get(&sp).copied()
    }

    /// Every in-bounds position producing `note`
    pub fn equivs(&self, note: u8) -> &[StringPos] {
        self.equivs_lookup.get(&note).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// String index to MIDI channel routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMapper {
    mode: ChannelMode,
}

impl ChannelMapper {
    fn new(mode: ChannelMode) -> ChannelMapper {
        ChannelMapper { mode }
    }

    /// `None` means the string falls outside the channel window and is mute
    pub fn channel(&self, str_index: u8) -> Option<u8> {
        match self.mode {
            ChannelMode::Single => Some(MIDI_BASE_CHANNEL),
            ChannelMode::Multi => {
                let channel = MIDI_BASE_CHANNEL + str_index;
                (channel <= MIDI_MAX_CHANNEL).then_some(channel)
            }
        }
    }
}

/// Bookkeeping for one held note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NoteInfo {
    velocity: u8,
    polytouch: Option<u8>,
}

/// The held frets of one string, kept sorted by pitch
///
/// Only the highest entry sounds; the rest are tracked so releasing the top
/// fret can re-sound the one underneath (pull-off).
#[derive(Debug, Clone, Default)]
struct ChokeGroup {
    note_order: Vec<u8>,
    note_info: HashMap<u8, NoteInfo>,
}

impl ChokeGroup {
    fn max_note(&self) -> Option<(u8, NoteInfo)> {
        let note = *self.note_order.last()?;
        Some((note, self.note_info[&note]))
    }

    /// Record a press (velocity > 0) or release (velocity == 0)
    fn pluck(&mut self, note: u8, velocity: u8) {
        match self.note_order.binary_search(&note) {
            Ok(index) => {
                if velocity > 0 {
                    self.note_info
                        .insert(note, NoteInfo { velocity, polytouch: None });
                } else {
                    self.note_order.remove(index);
                    self.note_info.remove(&note);
                }
            }
            Err(index) => {
                if velocity > 0 {
                    self.note_order.insert(index, note);
                    self.note_info
                        .insert(note, NoteInfo { velocity, polytouch: None });
                }
            }
        }
    }

    fn touch(&mut self, note: u8, pressure: u8) {
        if let Some(info) = self.note_info.get_mut(&note) {
            info.polytouch = Some(pressure);
        }
    }
}

/// Play-mode strategy
///
/// Emitted messages are tagged with the string they belong to so the
/// fretboard can attribute them (mono mode crosses strings).
enum NoteHandler {
    /// Pass-through: every trigger emits exactly the incoming event
    Poly,
    /// One voice for the whole instrument; the previous note's off always
    /// precedes the new note's on
    Mono { last: Option<(u8, u8, u8)> },
    /// Per-string choke
    Tap { groups: Vec<ChokeGroup> },
}

impl NoteHandler {
    fn new(play_mode: PlayMode, num_strings: usize) -> NoteHandler {
        match play_mode {
            PlayMode::Poly => NoteHandler::Poly,
            PlayMode::Mono => NoteHandler::Mono { last: None },
            PlayMode::Tap => NoteHandler::Tap {
                groups: (0..num_strings).map(|_| ChokeGroup::default()).collect(),
            },
        }
    }

    /// Apply one trigger; velocity 0 is a release
    fn handle(
        &mut self,
        str_index: u8,
        channel: u8,
        note: u8,
        velocity: u8,
    ) -> Vec<(u8, ChannelMessage)> {
        match self {
            NoteHandler::Poly => {
                if velocity > 0 {
                    vec![(str_index, ChannelMessage::NoteOn { channel, note, velocity })]
                } else {
                    vec![(str_index, ChannelMessage::NoteOff { channel, note })]
                }
            }
            NoteHandler::Mono { last } => {
                let mut out = Vec::new();
                if velocity > 0 {
                    if let Some((prev_str, prev_channel, prev_note)) = last.take() {
                        out.push((
                            prev_str,
                            ChannelMessage::NoteOff { channel: prev_channel, note: prev_note },
                        ));
                    }
                    out.push((str_index, ChannelMessage::NoteOn { channel, note, velocity }));
                    *last = Some((str_index, channel, note));
                } else if *last == Some((str_index, channel, note)) {
                    out.push((str_index, ChannelMessage::NoteOff { channel, note }));
                    *last = None;
                }
                out
            }
            NoteHandler::Tap { groups } => {
                let Some(group) = groups.get_mut(str_index as usize) else {
                    return Vec::new();
                };
                let prev = group.max_note();
                group.pluck(note, velocity);
                let cur = group.max_note();

                let mut out = Vec::new();
                match (prev, cur) {
                    (None, None) => {}
                    (Some((prev_note, _)), None) => {
                        out.push((str_index, ChannelMessage::NoteOff { channel, note: prev_note }));
                    }
                    (None, Some((cur_note, info))) => {
                        out.push((
                            str_index,
                            ChannelMessage::NoteOn { channel, note: cur_note, velocity: info.velocity },
                        ));
                    }
                    (Some((prev_note, _)), Some((cur_note, info))) if prev_note != cur_note => {
                        if velocity > 0 {
                            // Hammer-on: on before off to keep the
                            // envelopes overlapping
                            out.push((
                                str_index,
                                ChannelMessage::NoteOn {
                                    channel,
                                    note: cur_note,
                                    velocity: info.velocity,
                                },
                            ));
                            out.push((
                                str_index,
                                ChannelMessage::NoteOff { channel, note: prev_note },
                            ));
                        } else {
                            // Pull-off: silence the top fret, re-sound the
                            // one underneath at its recorded velocity
                            out.push((
                                str_index,
                                ChannelMessage::NoteOff { channel, note: prev_note },
                            ));
                            out.push((
                                str_index,
                                ChannelMessage::NoteOn {
                                    channel,
                                    note: cur_note,
                                    velocity: info.velocity,
                                },
                            ));
                        }
                    }
                    // Max unchanged: a lower fret moved, nothing sounds
                    (Some(_), Some(_)) => {}
                }
                out
            }
        }
    }

    fn touch(&mut self, str_index: u8, note: u8, pressure: u8) {
        if let NoteHandler::Tap { groups } = self
            && let Some(group) = groups.get_mut(str_index as usize)
        {
            group.touch(note, pressure);
        }
    }

    fn reset(&mut self) {
        match self {
            NoteHandler::Poly => {}
            NoteHandler::Mono { last } => *last = None,
            NoteHandler::Tap { groups } => {
                for group in groups {
                    *group = ChokeGroup::default();
                }
            }
        }
    }
}

/// Which notes are sounding where, and what each position should display
pub struct NoteTracker {
    /// Per channel, the notes whose most recent emitted event was a
    /// sounding note-on
    chan_notes: BTreeMap<u8, BTreeSet<u8>>,
    /// Positions whose most recent emitted event was a sounding note-on
    primary: BTreeMap<StringPos, (u8, u8)>,
    vis: BTreeMap<StringPos, VisState>,
}

impl NoteTracker {
    fn new() -> NoteTracker {
        NoteTracker {
            chan_notes: BTreeMap::new(),
            primary: BTreeMap::new(),
            vis: BTreeMap::new(),
        }
    }

    pub fn is_sounding(&self, channel: u8, note: u8) -> bool {
        self.chan_notes
            .get(&channel)
            .is_some_and(|notes| notes.contains(&note))
    }

    /// Total notes currently held across all channels
    pub fn held_count(&self) -> usize {
        self.chan_notes.values().map(BTreeSet::len).sum()
    }

    fn vis_for(&self, sp: StringPos, note: u8, mapper: &ChannelMapper) -> VisState {
        if self.primary.contains_key(&sp) {
            return VisState::OnPrimary;
        }
        let Some(channel) = mapper.channel(sp.str_index) else {
            return VisState::Off;
        };
        if self.is_sounding(channel, note) {
            VisState::OnDisabled
        } else if self
            .chan_notes
            .iter()
            .any(|(c, notes)| *c != channel && notes.contains(&note))
        {
            VisState::OnLinked
        } else {
            VisState::Off
        }
    }

    /// Record an emitted message and return the visibility changes it
    /// causes at its own position and every equivalent
    fn record(
        &mut self,
        fmsg: &FretboardMessage,
        mapper: &ChannelMapper,
    ) -> Vec<(StringPos, VisState)> {
        let channel = fmsg.msg.channel();
        let note = fmsg.msg.note();
        match fmsg.msg {
            ChannelMessage::NoteOn { velocity, .. } if velocity > 0 => {
                self.chan_notes.entry(channel).or_default().insert(note);
                self.primary.insert(fmsg.str_pos, (channel, note));
            }
            ChannelMessage::NoteOn { .. } | ChannelMessage::NoteOff { .. } => {
                if let Some(notes) = self.chan_notes.get_mut(&channel) {
                    notes.remove(&note);
                    if notes.is_empty() {
                        self.chan_notes.remove(&channel);
                    }
                }
                self.primary.remove(&fmsg.str_pos);
            }
            ChannelMessage::PolyPressure { .. } => {}
        }

        let mut changes = Vec::new();
        for sp in std::iter::once(fmsg.str_pos).chain(fmsg.equivs.iter().copied()) {
            let new_vis = self.vis_for(sp, note, mapper);
            let old_vis = self.vis.get(&sp).copied().unwrap_or_default();
            if new_vis != old_vis {
                if new_vis == VisState::Off {
                    self.vis.remove(&sp);
                } else {
                    self.vis.insert(sp, new_vis);
                }
                changes.push((sp, new_vis));
            }
        }
        changes
    }

    /// Drop all state: note-offs for everything held, everything dark
    fn clean(&mut self) -> (Vec<(StringPos, u8, u8)>, Vec<(StringPos, VisState)>) {
        let mut offs = Vec::new();
        let mut seen: BTreeSet<(u8, u8)> = BTreeSet::new();
        for (&sp, &(channel, note)) in &self.primary {
            if self.is_sounding(channel, note) && seen.insert((channel, note)) {
                offs.push((sp, channel, note));
            }
        }
        let vis_changes = self
            .vis
            .keys()
            .map(|&sp| (sp, VisState::Off))
            .collect();
        self.chan_notes.clear();
        self.primary.clear();
        self.vis.clear();
        (offs, vis_changes)
    }
}

/// The fretboard engine proper
pub struct Fretboard {
    config: FretboardConfig,
    bounds: Option<StringBounds>,
    tuner: FixedTuner,
    mapper: ChannelMapper,
    handler: NoteHandler,
    tracker: NoteTracker,
}

impl Fretboard {
    pub fn new(bounds: Option<StringBounds>, config: &Config) -> Fretboard {
        let fret_config = FretboardConfig::extract(config);
        let tuner = FixedTuner::new(&fret_config.tuning, bounds.as_ref());
        let mapper = ChannelMapper::new(fret_config.chan_mode);
        let handler = NoteHandler::new(fret_config.play_mode, fret_config.tuning.len());
        Fretboard {
            config: fret_config,
            bounds,
            tuner,
            mapper,
            handler,
            tracker: NoteTracker::new(),
        }
    }

    /// The MIDI note at a position, if playable
    pub fn note(&self, sp: StringPos) -> Option<u8> {
        self.tuner.note(sp)
    }

    pub fn tracker(&self) -> &NoteTracker {
        &self.tracker
    }

    fn clamp_velocity(&self, velocity: u8) -> u8 {
        if velocity == 0 {
            0
        } else {
            velocity.max(self.config.min_velocity)
        }
    }

    fn fret_msg(&self, str_index: u8, msg: ChannelMessage) -> FretboardMessage {
        let note = msg.note();
        let fret = note as i16 - self.config.tuning[str_index as usize] as i16;
        let str_pos = StringPos { str_index, fret };
        let equivs = self
            .tuner
            .equivs(note)
            .iter()
            .copied()
            .filter(|&sp| sp != str_pos)
            .collect();
        FretboardMessage { str_pos, equivs, msg }
    }

    /// Apply a pad strike or release at a string position
    pub fn trigger(&mut self, sp: StringPos, velocity: u8) -> NoteEffects {
        let mut fx = NoteEffects::default();
        let Some(note) = self.tuner.note(sp) else {
            return fx;
        };
        let Some(channel) = self.mapper.channel(sp.str_index) else {
            return fx;
        };
        let velocity = self.clamp_velocity(velocity);
        debug!(str_index = sp.str_index, fret = sp.fret, note, velocity, "trigger");
        for (str_index, msg) in self.handler.handle(sp.str_index, channel, note, velocity) {
            let fmsg = self.fret_msg(str_index, msg);
            fx.vis.extend(self.tracker.record(&fmsg, &self.mapper));
            fx.msgs.push(fmsg);
        }
        fx
    }

    /// Apply polyphonic aftertouch at a string position
    ///
    /// Forwarded only while the note is actually sounding on its channel.
    pub fn pressure(&mut self, sp: StringPos, pressure: u8) -> NoteEffects {
        let mut fx = NoteEffects::default();
        let Some(note) = self.tuner.note(sp) else {
            return fx;
        };
        let Some(channel) = self.mapper.channel(sp.str_index) else {
            return fx;
        };
        self.handler.touch(sp.str_index, note, pressure);
        if self.tracker.is_sounding(channel, note) {
            let fmsg = self.fret_msg(
                sp.str_index,
                ChannelMessage::PolyPressure { channel, note, pressure },
            );
            fx.msgs.push(fmsg);
        }
        fx
    }

    /// Note-offs for everything sounding, and all visibility back to off
    ///
    /// Uses the current mapping, so it must run before any reconfiguration
    /// replaces the tuner.
    pub fn clean_fx(&mut self) -> NoteEffects {
        let (offs, vis_changes) = self.tracker.clean();
        self.handler.reset();
        let msgs = offs
            .into_iter()
            .map(|(sp, channel, note)| {
                let equivs = self
                    .tuner
                    .equivs(note)
                    .iter()
                    .copied()
                    .filter(|&e| e != sp)
                    .collect();
                FretboardMessage {
                    str_pos: sp,
                    equivs,
                    msg: ChannelMessage::NoteOff { channel, note },
                }
            })
            .collect();
        NoteEffects { vis: vis_changes.into_iter().collect(), msgs }
    }

    /// Adopt a new config/bounds; returns the cleanup effects if anything
    /// actually changed
    pub fn handle_config(
        &mut self,
        bounds: Option<StringBounds>,
        config: &Config,
        reset: bool,
    ) -> Option<NoteEffects> {
        let next = FretboardConfig::extract(config);
        if next == self.config && bounds == self.bounds && !reset {
            return None;
        }
        let fx = self.clean_fx();
        self.config = next;
        self.bounds = bounds;
        self.tuner = FixedTuner::new(&self.config.tuning, self.bounds.as_ref());
        self.mapper = ChannelMapper::new(self.config.chan_mode);
        self.handler = NoteHandler::new(self.config.play_mode, self.config.tuning.len());
        Some(fx)
    }
}
