// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Shadow / diff display driver
//!
//! [`PushShadow`] remembers the last state committed to the controller
//! (LCD text, pad colors, button illumination). Drawing happens inside a
//! [`DrawContext`], which buffers writes; [`DrawContext::commit`] compares
//! the buffer against the stored state and emits exactly one message per
//! changed cell (LCD at row granularity). Redraw code can therefore repaint
//! everything freely and only deltas hit the wire.

use crate::color::Color;
use crate::constants::{ButtonCC, ButtonIllum, DISPLAY_MAX_LINE_LEN, DISPLAY_MAX_ROWS};
use crate::error::PortError;
use crate::pos::Pos;
use crate::push::{PushInterface, PushOutput};
use std::collections::BTreeMap;

/// One row of committed or buffered LCD text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LcdRow {
    buffer: [u8; DISPLAY_MAX_LINE_LEN as usize],
}

impl LcdRow {
    fn blank() -> LcdRow {
        LcdRow { buffer: [b' '; DISPLAY_MAX_LINE_LEN as usize] }
    }

    fn set_text(&mut self, start: usize, text: &str) {
        debug_assert!(start + text.len() <= self.buffer.len());
        for (i, c) in text.chars().enumerate() {
            self.buffer[start + i] = if c.is_ascii() { c as u8 } else { b'?' };
        }
    }

    fn text(&self) -> String {
        self.buffer.iter().map(|&b| b as char).collect()
    }
}

/// Last-committed controller state
struct ShadowState {
    lcd: [LcdRow; DISPLAY_MAX_ROWS as usize],
    /// Absent key = pad dark
    pads: BTreeMap<Pos, Color>,
    /// Absent key = button dark
    buttons: BTreeMap<ButtonCC, ButtonIllum>,
}

impl ShadowState {
    fn fresh() -> ShadowState {
        ShadowState {
            lcd: [LcdRow::blank(); DISPLAY_MAX_ROWS as usize],
            pads: BTreeMap::new(),
            buttons: BTreeMap::new(),
        }
    }
}

/// Diffing layer between display logic and the controller port
pub struct PushShadow {
    output: PushOutput,
    state: ShadowState,
}

impl PushShadow {
    /// Wrap a direct output; assumes the controller is currently blank
    /// (call [`PushShadow::reset`] first if unsure)
    pub fn new(output: PushOutput) -> PushShadow {
        PushShadow { output, state: ShadowState::fresh() }
    }

    /// Blank the controller and forget all committed state
    pub fn reset(&mut self) -> Result<(), PortError> {
        self.output.reset()?;
        self.state = ShadowState::fresh();
        Ok(())
    }

    /// Open a drawing scope; nothing is sent until the context commits
    pub fn context(&mut self) -> DrawContext<'_> {
        DrawContext {
            shadow: self,
            lcd: [None; DISPLAY_MAX_ROWS as usize],
            pads: BTreeMap::new(),
            buttons: BTreeMap::new(),
        }
    }
}

/// Buffered drawing scope over a [`PushShadow`]
///
/// An LCD row touched in this scope starts blank, so callers redraw rows
/// wholesale rather than patching committed text.
pub struct DrawContext<'a> {
    shadow: &'a mut PushShadow,
    lcd: [Option<LcdRow>; DISPLAY_MAX_ROWS as usize],
    pads: BTreeMap<Pos, Option<Color>>,
    buttons: BTreeMap<ButtonCC, Option<ButtonIllum>>,
}

impl DrawContext<'_> {
    /// Diff the buffer against committed state and emit the changes
    pub fn commit(self) -> Result<(), PortError> {
        let DrawContext { shadow, lcd, pads, buttons } = self;

        for (row, new_row) in lcd.iter().enumerate() {
            if let Some(new_row) = new_row
                && shadow.state.lcd[row] != *new_row
            {
                shadow.output.lcd_display_raw(row as u8, 0, &new_row.text())?;
                shadow.state.lcd[row] = *new_row;
            }
        }

        for (pos, new_color) in pads {
            let old_color = shadow.state.pads.get(&pos).copied();
            if old_color == new_color {
                continue;
            }
            match new_color {
                Some(color) => {
                    shadow.output.pad_set_color(pos, color)?;
                    shadow.state.pads.insert(pos, color);
                }
                None => {
                    shadow.output.pad_led_off(pos)?;
                    shadow.state.pads.remove(&pos);
                }
            }
        }

        for (button, new_illum) in buttons {
            let old_illum = shadow.state.buttons.get(&button).copied();
            if old_illum == new_illum {
                continue;
            }
            match new_illum {
                Some(illum) => {
                    shadow.output.button_set_illum(button, illum)?;
                    shadow.state.buttons.insert(button, illum);
                }
                None => {
                    shadow.output.button_off(button)?;
                    shadow.state.buttons.remove(&button);
                }
            }
        }

        Ok(())
    }
}

impl PushInterface for DrawContext<'_> {
    fn pad_set_color(&mut self, pos: Pos, color: Color) -> Result<(), PortError> {
        self.pads.insert(pos, Some(color));
        Ok(())
    }

    fn pad_led_off(&mut self, pos: Pos) -> Result<(), PortError> {
        self.pads.insert(pos, None);
        Ok(())
    }

    fn lcd_display_raw(&mut self, row: u8, line_col: u8, text: &str) -> Result<(), PortError> {
        let slot = &mut self.lcd[row as usize];
        let lcd_row = slot.get_or_insert_with(LcdRow::blank);
        lcd_row.set_text(line_col as usize, text);
        Ok(())
    }

    fn button_set_illum(&mut self, button: ButtonCC, illum: ButtonIllum) -> Result<(), PortError> {
        self.buttons.insert(button, Some(illum));
        Ok(())
    }

    fn button_off(&mut self, button: ButtonCC) -> Result<(), PortError> {
        self.buttons.insert(button, None);
        Ok(())
    }
}
