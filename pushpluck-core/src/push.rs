// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Push 1 output protocol
//!
//! Pure byte builders for everything we send to the controller (pad RGB
//! sysex, pad LED notes, LCD block writes, button illumination CCs), the
//! [`PushInterface`] drawing trait, and [`PushOutput`], the direct
//! implementation over a MIDI sink. Display logic never talks to
//! `PushOutput` directly; it draws through the shadow (see `shadow.rs`),
//! which diffs against known state and forwards only changes here.

use crate::color::Color;
use crate::constants::{
    self, ButtonCC, ButtonIllum, DISPLAY_BLOCK_LEN, DISPLAY_HALF_BLOCK_LEN, DISPLAY_MAX_BLOCKS,
    DISPLAY_MAX_HALF_BLOCKS, DISPLAY_MAX_LINE_LEN, DISPLAY_MAX_ROWS, TimeDivCC,
};
use crate::error::PortError;
use crate::midi::MidiSink;
use crate::pos::Pos;
use tracing::info;

/// Wrap a raw payload in the Push sysex frame
pub fn frame_sysex(raw_data: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(raw_data.len() + 5);
    data.push(0xF0);
    data.extend_from_slice(&constants::PUSH_SYSEX_PREFIX);
    data.extend_from_slice(raw_data);
    data.push(0xF7);
    data
}

/// Sysex setting one pad to a 24-bit RGB color
///
/// Each color component is split into a 4-bit MSB/LSB pair.
pub fn make_color_msg(pos: Pos, color: Color) -> Vec<u8> {
    let index = pos.to_index();
    let mut raw_data = vec![0x04, 0x00, 0x08, index, 0x00];
    for component in [color.red, color.green, color.blue] {
        raw_data.push((component >> 4) & 0x0F);
        raw_data.push(component & 0x0F);
    }
    frame_sysex(&raw_data)
}

/// Note message setting a pad LED's brightness (0 = off)
pub fn make_led_msg(pos: Pos, value: u8) -> Vec<u8> {
    vec![0x90, pos.to_note(), value]
}

/// Sysex writing `text` at `line_col` of an LCD row
///
/// Rows are 0..4 top to bottom, columns 0..68. Non-ASCII characters are
/// replaced since the LCD is ASCII-only.
pub fn make_lcd_msg(row: u8, line_col: u8, text: &str) -> Vec<u8> {
    let len = text.chars().count() as u8;
    debug_assert!(row < DISPLAY_MAX_ROWS);
    debug_assert!(line_col + len <= DISPLAY_MAX_LINE_LEN);
    let mut raw_data = vec![27 - row, 0x00, len + 1, line_col];
    raw_data.extend(text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }));
    frame_sysex(&raw_data)
}

/// CC message setting a button's illumination
pub fn make_button_msg(button: ButtonCC, value: u8) -> Vec<u8> {
    vec![0xB0, button.to_cc(), value]
}

/// CC message setting a time-division button's illumination
pub fn make_time_div_msg(time_div: TimeDivCC, value: u8) -> Vec<u8> {
    vec![0xB0, time_div.to_cc(), value]
}

/// Drawing operations on the Push surface
///
/// Implemented directly by [`PushOutput`] and, buffered, by the shadow's
/// draw context.
pub trait PushInterface {
    fn pad_set_color(&mut self, pos: Pos, color: Color) -> Result<(), PortError>;

    fn pad_led_off(&mut self, pos: Pos) -> Result<(), PortError>;

    fn lcd_display_raw(&mut self, row: u8, line_col: u8, text: &str) -> Result<(), PortError>;

    fn button_set_illum(&mut self, button: ButtonCC, illum: ButtonIllum) -> Result<(), PortError>;

    fn button_off(&mut self, button: ButtonCC) -> Result<(), PortError>;

    /// Write a whole LCD row, space-padded
    fn lcd_display_line(&mut self, row: u8, text: &str) -> Result<(), PortError> {
        let padded = format!("{:<width$}", text, width = DISPLAY_MAX_LINE_LEN as usize);
        self.lcd_display_raw(row, 0, &padded)
    }

    /// Write one 17-character block (4 per row)
    fn lcd_display_block(&mut self, row: u8, block_col: u8, text: &str) -> Result<(), PortError> {
        debug_assert!(block_col < DISPLAY_MAX_BLOCKS);
        let clipped: String = text.chars().take(DISPLAY_BLOCK_LEN as usize).collect();
        let padded = format!("{:<width$}", clipped, width = DISPLAY_BLOCK_LEN as usize);
        self.lcd_display_raw(row, DISPLAY_BLOCK_LEN * block_col, &padded)
    }

    /// Write one 8-character half block (8 per row, one per center knob)
    fn lcd_display_half_block(
        &mut self,
        row: u8,
        half_col: u8,
        text: &str,
    ) -> Result<(), PortError> {
        debug_assert!(half_col < DISPLAY_MAX_HALF_BLOCKS);
        let clipped: String = text.chars().take(DISPLAY_HALF_BLOCK_LEN as usize).collect();
        let padded = format!("{:<width$}", clipped, width = DISPLAY_HALF_BLOCK_LEN as usize);
        self.lcd_display_raw(row, DISPLAY_HALF_BLOCK_LEN * half_col, &padded)
    }
}

/// Direct Push drawing over a MIDI sink
pub struct PushOutput {
    sink: Box<dyn MidiSink>,
}

impl PushOutput {
    pub fn new(sink: Box<dyn MidiSink>) -> PushOutput {
        PushOutput { sink }
    }

    /// Blank the whole surface: LCD cleared, every pad and button dark
    pub fn reset(&mut self) -> Result<(), PortError> {
        info!("resetting push display");
        for row in 0..DISPLAY_MAX_ROWS {
            self.lcd_display_line(row, "")?;
        }
        for pos in Pos::iter_all() {
            self.pad_led_off(pos)?;
        }
        for button in ButtonCC::ALL {
            self.button_off(button)?;
        }
        for time_div in TimeDivCC::ALL {
            self.sink.send_msg(&make_time_div_msg(time_div, 0))?;
        }
        Ok(())
    }
}

impl PushInterface for PushOutput {
    fn pad_set_color(&mut self, pos: Pos, color: Color) -> Result<(), PortError> {
        self.sink.send_msg(&make_color_msg(pos, color))
    }

    fn pad_led_off(&mut self, pos: Pos) -> Result<(), PortError> {
        self.sink.send_msg(&make_led_msg(pos, 0))
    }

    fn lcd_display_raw(&mut self, row: u8, line_col: u8, text: &str) -> Result<(), PortError> {
        self.sink.send_msg(&make_lcd_msg(row, line_col, text))
    }

    fn button_set_illum(&mut self, button: ButtonCC, illum: ButtonIllum) -> Result<(), PortError> {
        self.sink.send_msg(&make_button_msg(button, illum.to_value()))
    }

    fn button_off(&mut self, button: ButtonCC) -> Result<(), PortError> {
        self.sink.send_msg(&make_button_msg(button, 0))
    }
}
