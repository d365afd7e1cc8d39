// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Menu: pages, knob controls, and config mutation
//!
//! A small state machine over the Device / Scales / Browse pages. Each page
//! binds the eight center encoder knobs to [`KnobControl`]s; a control
//! integrates encoder ticks into an accumulator and, every `sensitivity`
//! ticks, steps its config field through its value range. Value ranges
//! clamp at their rails (the accumulator parks at the rail instead of
//! wrapping). Directional and octave buttons mutate the offsets directly.
//!
//! The menu never owns the config: callers pass the current one in and get
//! the updated one back.

use crate::config::{
    ChannelMode, Config, Layout, PlayMode, profile_index, MAX_FRET_OFFSET, MAX_STR_OFFSET,
    MIN_FRET_OFFSET, MIN_STR_OFFSET, PROFILES,
};
use crate::constants::{ButtonCC, ButtonIllum, DISPLAY_MAX_HALF_BLOCKS, KnobGroup};
use crate::error::PortError;
use crate::events::{ButtonEvent, KnobEvent, PushEvent};
use crate::push::PushInterface;
use crate::scale::{NoteName, SCALES, scale_index};
use tracing::debug;

/// Which menu page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Device,
    Scales,
    Browse,
}

impl Page {
    fn title(self) -> &'static str {
        match self {
            Page::Device => "Device",
            Page::Scales => "Scales",
            Page::Browse => "Browse",
        }
    }
}

/// The value window a knob moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValRange {
    Int { min: i16, max: i16 },
    Choice { count: usize },
}

impl ValRange {
    fn contains(self, index: i16) -> bool {
        match self {
            ValRange::Int { min, max } => (min..=max).contains(&index),
            ValRange::Choice { count } => (0..count as i16).contains(&index),
        }
    }

    /// One step in `dir`, clamped at the rails
    fn step(self, index: i16, dir: i16) -> i16 {
        match self {
            ValRange::Int { min, max } => (index + dir).clamp(min, max),
            ValRange::Choice { count } => (index + dir).clamp(0, count as i16 - 1),
        }
    }
}

/// A config field a knob can be bound to: getter, setter, range, renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigField {
    MinVelocity,
    Layout,
    PlayMode,
    ChannelMode,
    FretOffset,
    StringOffset,
    Root,
    Scale,
    Instrument,
}

impl ConfigField {
    fn range(self) -> ValRange {
        match self {
            ConfigField::MinVelocity => ValRange::Int { min: 0, max: 127 },
            ConfigField::Layout => ValRange::Choice { count: 2 },
            ConfigField::PlayMode => ValRange::Choice { count: 3 },
            ConfigField::ChannelMode => ValRange::Choice { count: 2 },
            ConfigField::FretOffset => {
                ValRange::Int { min: MIN_FRET_OFFSET, max: MAX_FRET_OFFSET }
            }
            ConfigField::StringOffset => {
                ValRange::Int { min: MIN_STR_OFFSET, max: MAX_STR_OFFSET }
            }
            ConfigField::Root => ValRange::Choice { count: NoteName::ALL.len() },
            ConfigField::Scale => ValRange::Choice { count: SCALES.len() },
            ConfigField::Instrument => ValRange::Choice { count: PROFILES.len() },
        }
    }

    /// Current position of this field within its range
    fn index(self, config: &Config) -> i16 {
        match self {
            ConfigField::MinVelocity => config.min_velocity as i16,
            ConfigField::Layout => match config.layout {
                Layout::Horiz => 0,
                Layout::Vert => 1,
            },
            ConfigField::PlayMode => match config.play_mode {
                PlayMode::Tap => 0,
                PlayMode::Poly => 1,
                PlayMode::Mono => 2,
            },
            ConfigField::ChannelMode => match config.chan_mode {
                ChannelMode::Single => 0,
                ChannelMode::Multi => 1,
            },
            ConfigField::FretOffset => config.fret_offset,
            ConfigField::StringOffset => config.str_offset,
            ConfigField::Root => config.root.offset() as i16,
            ConfigField::Scale => scale_index(config.scale) as i16,
            ConfigField::Instrument => profile_index(&config.profile) as i16,
        }
    }

    /// A config with this field moved to `index`
    fn with_index(self, config: &Config, index: i16) -> Config {
        let mut next = config.clone();
        match self {
            ConfigField::MinVelocity => next.min_velocity = index as u8,
            ConfigField::Layout => {
                next.layout = if index == 0 { Layout::Horiz } else { Layout::Vert }
            }
            ConfigField::PlayMode => {
                next.play_mode = match index {
                    0 => PlayMode::Tap,
                    1 => PlayMode::Poly,
                    _ => PlayMode::Mono,
                }
            }
            ConfigField::ChannelMode => {
                next.chan_mode = if index == 0 { ChannelMode::Single } else { ChannelMode::Multi }
            }
            ConfigField::FretOffset => next.fret_offset = index,
            ConfigField::StringOffset => next.str_offset = index,
            ConfigField::Root => next.root = NoteName::from_offset(index as u8),
            ConfigField::Scale => next.scale = SCALES[index as usize],
            ConfigField::Instrument => next.profile = PROFILES[index as usize],
        }
        next
    }

    /// Current value rendered for the LCD
    fn render(self, config: &Config) -> String {
        match self {
            ConfigField::MinVelocity => config.min_velocity.to_string(),
            ConfigField::Layout => config.layout.as_str().to_string(),
            ConfigField::PlayMode => config.play_mode.as_str().to_string(),
            ConfigField::ChannelMode => config.chan_mode.as_str().to_string(),
            ConfigField::FretOffset => config.fret_offset.to_string(),
            ConfigField::StringOffset => config.str_offset.to_string(),
            ConfigField::Root => config.root.as_str().to_string(),
            ConfigField::Scale => config.scale.name.to_string(),
            ConfigField::Instrument => config.profile.instrument_name.to_string(),
        }
    }
}

/// One encoder knob bound to a config field
#[derive(Debug, Clone, Copy)]
struct KnobControl {
    name: &'static str,
    /// Encoder ticks per value step
    sensitivity: u8,
    range: ValRange,
    field: ConfigField,
    accum: i16,
}

impl KnobControl {
    /// Panics if the config's current value falls outside the knob's
    /// range; that is a wiring bug, not a user error.
    fn new(name: &'static str, sensitivity: u8, field: ConfigField, config: &Config) -> KnobControl {
        let range = field.range();
        let index = field.index(config);
        assert!(
            range.contains(index),
            "knob '{name}' initial value {index} outside its range"
        );
        KnobControl { name, sensitivity, range, field, accum: 0 }
    }

    /// Integrate one encoder tick; `Some` when the value actually stepped
    fn on_tick(&mut self, config: &Config, clockwise: bool) -> Option<Config> {
        self.accum += if clockwise { 1 } else { -1 };
        let sens = self.sensitivity as i16;
        if self.accum.abs() < sens {
            return None;
        }
        let dir = self.accum.signum();
        let cur = self.field.index(config);
        let next = self.range.step(cur, dir);
        if next == cur {
            // Saturated: park the accumulator at the rail
            self.accum = dir * sens;
            None
        } else {
            self.accum = 0;
            debug!(knob = self.name, from = cur, to = next, "knob stepped");
            Some(self.field.with_index(config, next))
        }
    }
}

type KnobRow = [Option<KnobControl>; DISPLAY_MAX_HALF_BLOCKS as usize];

/// The menu state machine
pub struct Menu {
    page: Page,
    device_knobs: KnobRow,
    scales_knobs: KnobRow,
    browse_knobs: KnobRow,
}

impl Menu {
    pub fn new(config: &Config) -> Menu {
        let device_knobs: KnobRow = [
            Some(KnobControl::new("MinVel", 1, ConfigField::MinVelocity, config)),
            Some(KnobControl::new("Layout", 4, ConfigField::Layout, config)),
            Some(KnobControl::new("Mode", 4, ConfigField::PlayMode, config)),
            Some(KnobControl::new("Chans", 4, ConfigField::ChannelMode, config)),
            Some(KnobControl::new("SemOff", 4, ConfigField::FretOffset, config)),
            Some(KnobControl::new("StrOff", 4, ConfigField::StringOffset, config)),
            None,
            None,
        ];
        let scales_knobs: KnobRow = [
            Some(KnobControl::new("Root", 4, ConfigField::Root, config)),
            Some(KnobControl::new("Scale", 4, ConfigField::Scale, config)),
            None,
            None,
            None,
            None,
            None,
            None,
        ];
        let browse_knobs: KnobRow = [
            Some(KnobControl::new("Instr", 4, ConfigField::Instrument, config)),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ];
        Menu {
            page: Page::default(),
            device_knobs,
            scales_knobs,
            browse_knobs,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    fn knobs_mut(&mut self) -> &mut KnobRow {
        match self.page {
            Page::Device => &mut self.device_knobs,
            Page::Scales => &mut self.scales_knobs,
            Page::Browse => &mut self.browse_knobs,
        }
    }

    fn knobs(&self) -> &KnobRow {
        match self.page {
            Page::Device => &self.device_knobs,
            Page::Scales => &self.scales_knobs,
            Page::Browse => &self.browse_knobs,
        }
    }

    /// Back to the Device page with settled accumulators, and repaint
    pub fn handle_reset(
        &mut self,
        push: &mut dyn PushInterface,
        config: &Config,
    ) -> Result<(), PortError> {
        self.page = Page::Device;
        for knobs in [&mut self.device_knobs, &mut self.scales_knobs, &mut self.browse_knobs] {
            for knob in knobs.iter_mut().flatten() {
                knob.accum = 0;
            }
        }
        self.redraw(push, config)
    }

    /// Repaint the LCD and menu buttons for the current page
    pub fn redraw(&self, push: &mut dyn PushInterface, config: &Config) -> Result<(), PortError> {
        let header = format!(
            "[{}] {}/{}  {} {}",
            self.page.title(),
            config.profile.instrument_name,
            config.profile.tuning_name,
            config.root.as_str(),
            config.scale.name,
        );
        push.lcd_display_line(0, &header)?;
        push.lcd_display_line(1, "")?;
        for (i, slot) in self.knobs().iter().enumerate() {
            let (name, value) = match slot {
                Some(knob) => (knob.name, knob.field.render(config)),
                None => ("", String::new()),
            };
            push.lcd_display_half_block(2, i as u8, name)?;
            push.lcd_display_half_block(3, i as u8, &value)?;
        }

        for (button, page) in [
            (ButtonCC::Device, Page::Device),
            (ButtonCC::Scales, Page::Scales),
            (ButtonCC::Browse, Page::Browse),
        ] {
            let illum = if self.page == page { ButtonIllum::Full } else { ButtonIllum::Half };
            push.button_set_illum(button, illum)?;
        }
        for button in [
            ButtonCC::Left,
            ButtonCC::Right,
            ButtonCC::Up,
            ButtonCC::Down,
            ButtonCC::OctaveDown,
            ButtonCC::OctaveUp,
        ] {
            push.button_set_illum(button, ButtonIllum::Half)?;
        }
        push.button_set_illum(ButtonCC::Undo, ButtonIllum::Full)?;
        Ok(())
    }

    /// Handle a non-pad event; `Some` when the config changed
    pub fn handle_event(
        &mut self,
        push: &mut dyn PushInterface,
        config: &Config,
        event: &PushEvent,
    ) -> Result<Option<Config>, PortError> {
        match event {
            PushEvent::Button(ButtonEvent { button, pressed: true }) => {
                self.handle_button(push, config, *button)
            }
            PushEvent::Knob(KnobEvent { group: KnobGroup::Center, offset, clockwise }) => {
                let slot = &mut self.knobs_mut()[*offset as usize];
                let next = slot
                    .as_mut()
                    .and_then(|knob| knob.on_tick(config, *clockwise));
                if let Some(next) = &next {
                    self.redraw(push, next)?;
                }
                Ok(next)
            }
            // Left/right knob banks, time divisions and the selector rows
            // have no menu bindings
            _ => Ok(None),
        }
    }

    fn handle_button(
        &mut self,
        push: &mut dyn PushInterface,
        config: &Config,
        button: ButtonCC,
    ) -> Result<Option<Config>, PortError> {
        let next = match button {
            ButtonCC::Device => {
                self.page = Page::Device;
                self.redraw(push, config)?;
                None
            }
            ButtonCC::Scales => {
                self.page = Page::Scales;
                self.redraw(push, config)?;
                None
            }
            ButtonCC::Browse => {
                self.page = Page::Browse;
                self.redraw(push, config)?;
                None
            }
            ButtonCC::Left => Some(config.shift_fret_offset(-1)),
            ButtonCC::Right => Some(config.shift_fret_offset(1)),
            ButtonCC::OctaveDown => Some(config.shift_fret_offset(-12)),
            ButtonCC::OctaveUp => Some(config.shift_fret_offset(12)),
            ButtonCC::Up => Some(config.shift_str_offset(1)),
            ButtonCC::Down => Some(config.shift_str_offset(-1)),
            _ => None,
        };
        match next {
            // A shift clamped at its rail produces an identical config;
            // nothing to propagate
            Some(next) if next != *config => {
                self.redraw(push, &next)?;
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }
}
