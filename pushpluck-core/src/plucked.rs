// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Top-level orchestrator
//!
//! [`Plucked`] owns the config, the menu, the pad colorizer and the display
//! shadow. Every decoded event is routed here: pad events go to the pads,
//! the Undo button triggers the global reset, everything else goes to the
//! menu, whose config changes are propagated back to the pads. All drawing
//! in one event's handling happens inside a single shadow context, so the
//! controller sees one minimal batch of deltas per event.

use crate::config::{ColorScheme, Config};
use crate::constants::ButtonCC;
use crate::error::PortError;
use crate::events::{ButtonEvent, PushEvent};
use crate::menu::Menu;
use crate::midi::{MidiSink, send_all_notes_off};
use crate::pads::Pads;
use crate::push::PushOutput;
use crate::shadow::PushShadow;
use tracing::{debug, info};

pub struct Plucked {
    config: Config,
    shadow: PushShadow,
    midi_processed: Box<dyn MidiSink>,
    pads: Pads,
    menu: Menu,
}

impl Plucked {
    pub fn new(
        push_sink: Box<dyn MidiSink>,
        midi_processed: Box<dyn MidiSink>,
        scheme: ColorScheme,
        config: Config,
    ) -> Plucked {
        let shadow = PushShadow::new(PushOutput::new(push_sink));
        let pads = Pads::new(scheme, &config);
        let menu = Menu::new(&config);
        Plucked { config, shadow, midi_processed, pads, menu }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Route one event
    pub fn handle_event(&mut self, event: &PushEvent) -> Result<(), PortError> {
        match event {
            PushEvent::Pad(pad_event) => {
                let mut ctx = self.shadow.context();
                self.pads
                    .handle_event(&mut ctx, &mut *self.midi_processed, pad_event)?;
                ctx.commit()
            }
            PushEvent::PadPressure(pressure_event) => {
                let mut ctx = self.shadow.context();
                self.pads
                    .handle_pressure(&mut ctx, &mut *self.midi_processed, pressure_event)?;
                ctx.commit()
            }
            PushEvent::Button(ButtonEvent { button: ButtonCC::Undo, pressed: true }) => {
                self.reset()
            }
            other => {
                let mut ctx = self.shadow.context();
                if let Some(next) = self.menu.handle_event(&mut ctx, &self.config, other)? {
                    debug!("menu produced new config");
                    self.config = next;
                    self.pads.handle_config(
                        &mut ctx,
                        &mut *self.midi_processed,
                        &self.config,
                        false,
                    )?;
                }
                ctx.commit()
            }
        }
    }

    /// Startup sequence: blank whatever the controller was showing, then
    /// paint the initial state
    pub fn startup(&mut self) -> Result<(), PortError> {
        self.shadow.reset()?;
        self.reset()
    }

    /// Global reset: menu to its default page, all notes off, full repaint
    ///
    /// Idempotent; runs at startup, on Undo, and before shutdown.
    pub fn reset(&mut self) -> Result<(), PortError> {
        info!("resetting");
        let mut ctx = self.shadow.context();
        self.menu.handle_reset(&mut ctx, &self.config)?;
        self.pads
            .handle_config(&mut ctx, &mut *self.midi_processed, &self.config, true)?;
        ctx.commit()
    }

    /// Drain every sounding note and blank the controller
    pub fn shutdown(&mut self) -> Result<(), PortError> {
        info!("shutting down");
        self.reset()?;
        send_all_notes_off(&mut *self.midi_processed)?;
        self.shadow.reset()
    }
}
