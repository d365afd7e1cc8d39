// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! MIDI I/O adapters
//!
//! The input adapter bridges the midir callback thread to the main loop via
//! a bounded crossbeam channel (the callback must never block). The output
//! adapters are a rate-limited sink for the Push itself (the controller is
//! easy to flood) and a virtual port for processed notes.
//!
//! # Platform Support
//!
//! Virtual port creation uses midir's unix support (CoreMIDI on macOS,
//! ALSA on Linux). Windows has no virtual ports without a third-party
//! driver like loopMIDI, so opening the processed port fails there.

use crate::error::PortError;
use crossbeam_channel::{Receiver, bounded};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

#[cfg(not(target_os = "windows"))]
use midir::os::unix::VirtualOutput;

/// Capacity of the callback-to-main-loop message queue
const INPUT_QUEUE_CAP: usize = 256;

/// A channel voice message produced by the fretboard engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    PolyPressure { channel: u8, note: u8, pressure: u8 },
}

impl ChannelMessage {
    pub fn channel(&self) -> u8 {
        match self {
            ChannelMessage::NoteOn { channel, .. }
            | ChannelMessage::NoteOff { channel, .. }
            | ChannelMessage::PolyPressure { channel, .. } => *channel,
        }
    }

    pub fn note(&self) -> u8 {
        match self {
            ChannelMessage::NoteOn { note, .. }
            | ChannelMessage::NoteOff { note, .. }
            | ChannelMessage::PolyPressure { note, .. } => *note,
        }
    }

    /// True for a note-on that actually makes sound (velocity > 0)
    pub fn is_sounding(&self) -> bool {
        matches!(self, ChannelMessage::NoteOn { velocity, .. } if *velocity > 0)
    }

    /// Raw MIDI bytes for this message
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            ChannelMessage::NoteOn { channel, note, velocity } => [0x90 | channel, note, velocity],
            ChannelMessage::NoteOff { channel, note } => [0x80 | channel, note, 0],
            ChannelMessage::PolyPressure { channel, note, pressure } => {
                [0xA0 | channel, note, pressure]
            }
        }
    }
}

/// Sink for outbound raw MIDI bytes
///
/// Send failures are fatal (the port is gone); callers propagate them up to
/// the daemon, which terminates.
pub trait MidiSink {
    fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError>;
}

/// Send "all notes off" and "reset all controllers" on every channel
pub fn send_all_notes_off(sink: &mut dyn MidiSink) -> Result<(), PortError> {
    for channel in 0..16u8 {
        sink.send_msg(&[0xB0 | channel, 123, 0])?;
        sink.send_msg(&[0xB0 | channel, 121, 0])?;
    }
    Ok(())
}

/// Blocking MIDI input fed by the midir callback thread
///
/// The callback pushes raw message bytes into a bounded queue with
/// `try_send` so it can never block the MIDI driver; the main loop drains
/// the queue with [`MidiInputQueue::recv_timeout`].
pub struct MidiInputQueue {
    port_name: String,
    /// Kept alive for the duration; dropping it closes the port
    _connection: MidiInputConnection<()>,
    receiver: Receiver<Vec<u8>>,
}

impl MidiInputQueue {
    /// Open the first input port whose name contains `port_match`
    pub fn open(port_match: &str) -> Result<MidiInputQueue, PortError> {
        let midi_in = MidiInput::new("pushpluck input").map_err(|e| PortError::Init(e.to_string()))?;
        let ports = midi_in.ports();

        let port = ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .map(|name| name.contains(port_match))
                    .unwrap_or(false)
            })
            .ok_or_else(|| PortError::NotFound(port_match.to_string()))?;

        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| port_match.to_string());

        let (tx, rx) = bounded::<Vec<u8>>(INPUT_QUEUE_CAP);
        let connection = midi_in
            .connect(
                port,
                "pushpluck-input",
                move |_timestamp, message, _| {
                    // Runs on the MIDI driver thread; must not block
                    if tx.try_send(message.to_vec()).is_err() {
                        warn!("input queue full, dropping {} byte message", message.len());
                    }
                },
                (),
            )
            .map_err(|e| PortError::ConnectionFailed(e.to_string()))?;

        debug!(port = %port_name, "opened MIDI input");

        Ok(MidiInputQueue {
            port_name,
            _connection: connection,
            receiver: rx,
        })
    }

    /// Block for the next message, up to `timeout`
    ///
    /// Returns `Ok(None)` on timeout so the caller can poll its shutdown
    /// flag between messages.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, PortError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => {
                trace!(port = %self.port_name, bytes = ?msg, "received");
                Ok(Some(msg))
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(None),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                Err(PortError::Disconnected(self.port_name.clone()))
            }
        }
    }
}

/// Rate-limited output to the Push controller
///
/// Enforces a monotonic minimum delay between sends by sleeping the calling
/// thread; redraw code can send freely and the floor is applied here.
pub struct RateLimitedSink {
    port_name: String,
    connection: MidiOutputConnection,
    delay: Duration,
    last_sent: Option<Instant>,
}

impl RateLimitedSink {
    /// Open the first output port whose name contains `port_match`
    pub fn open(port_match: &str, delay: Duration) -> Result<RateLimitedSink, PortError> {
        let midi_out =
            MidiOutput::new("pushpluck output").map_err(|e| PortError::Init(e.to_string()))?;
        let ports = midi_out.ports();

        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| name.contains(port_match))
                    .unwrap_or(false)
            })
            .ok_or_else(|| PortError::NotFound(port_match.to_string()))?;

        let port_name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| port_match.to_string());

        let connection = midi_out
            .connect(port, "pushpluck-output")
            .map_err(|e| PortError::ConnectionFailed(e.to_string()))?;

        debug!(port = %port_name, ?delay, "opened MIDI output");

        Ok(RateLimitedSink {
            port_name,
            connection,
            delay,
            last_sent: None,
        })
    }
}

impl MidiSink for RateLimitedSink {
    fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError> {
        if let Some(last) = self.last_sent {
            let limit = last + self.delay;
            let now = Instant::now();
            if now < limit {
                std::thread::sleep(limit - now);
                self.last_sent = Some(limit);
            } else {
                self.last_sent = Some(now);
            }
        } else {
            self.last_sent = Some(Instant::now());
        }

        trace!(port = %self.port_name, bytes = ?msg, "sending");
        self.connection
            .send(msg)
            .map_err(|e| PortError::SendFailed {
                port: self.port_name.clone(),
                message: e.to_string(),
            })
    }
}

/// Virtual output port for processed notes
pub struct VirtualSink {
    port_name: String,
    connection: MidiOutputConnection,
}

impl VirtualSink {
    /// Create a virtual port that other applications can connect to
    #[cfg(not(target_os = "windows"))]
    pub fn create(port_name: &str) -> Result<VirtualSink, PortError> {
        let midi_out =
            MidiOutput::new("pushpluck processed").map_err(|e| PortError::Init(e.to_string()))?;
        let connection = midi_out
            .create_virtual(port_name)
            .map_err(|e| PortError::ConnectionFailed(e.to_string()))?;

        debug!(port = %port_name, "created virtual MIDI output");

        Ok(VirtualSink {
            port_name: port_name.to_string(),
            connection,
        })
    }

    /// Virtual ports need a third-party driver on Windows (e.g. loopMIDI)
    #[cfg(target_os = "windows")]
    pub fn create(port_name: &str) -> Result<VirtualSink, PortError> {
        Err(PortError::Init(format!(
            "virtual port '{port_name}' not supported on Windows"
        )))
    }
}

impl MidiSink for VirtualSink {
    fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError> {
        trace!(port = %self.port_name, bytes = ?msg, "sending");
        self.connection
            .send(msg)
            .map_err(|e| PortError::SendFailed {
                port: self.port_name.clone(),
                message: e.to_string(),
            })
    }
}

/// The three ports the daemon runs on
pub struct PushPorts {
    pub midi_in: MidiInputQueue,
    pub midi_out: RateLimitedSink,
    pub midi_processed: VirtualSink,
}

impl PushPorts {
    /// Open the Push user port (in and out) and create the processed port
    pub fn open(
        push_port_name: &str,
        processed_port_name: &str,
        delay: Duration,
    ) -> Result<PushPorts, PortError> {
        let midi_in = MidiInputQueue::open(push_port_name)?;
        let midi_out = RateLimitedSink::open(push_port_name, delay)?;
        let midi_processed = VirtualSink::create(processed_port_name)?;
        Ok(PushPorts {
            midi_in,
            midi_out,
            midi_processed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_bytes() {
        let msg = ChannelMessage::NoteOn { channel: 0, note: 60, velocity: 100 };
        assert_eq!(msg.to_bytes(), [0x90, 60, 100]);
        assert!(msg.is_sounding());
    }

    #[test]
    fn test_note_off_bytes() {
        let msg = ChannelMessage::NoteOff { channel: 3, note: 41 };
        assert_eq!(msg.to_bytes(), [0x83, 41, 0]);
        assert!(!msg.is_sounding());
    }

    #[test]
    fn test_poly_pressure_bytes() {
        let msg = ChannelMessage::PolyPressure { channel: 1, note: 50, pressure: 77 };
        assert_eq!(msg.to_bytes(), [0xA1, 50, 77]);
        assert!(!msg.is_sounding());
    }

    #[test]
    fn test_zero_velocity_note_on_is_not_sounding() {
        let msg = ChannelMessage::NoteOn { channel: 0, note: 60, velocity: 0 };
        assert!(!msg.is_sounding());
    }

    struct CollectingSink(Vec<Vec<u8>>);

    impl MidiSink for CollectingSink {
        fn send_msg(&mut self, msg: &[u8]) -> Result<(), PortError> {
            self.0.push(msg.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_all_notes_off_covers_every_channel() {
        let mut sink = CollectingSink(Vec::new());
        send_all_notes_off(&mut sink).unwrap();
        assert_eq!(sink.0.len(), 32);
        for channel in 0..16u8 {
            assert!(sink.0.contains(&vec![0xB0 | channel, 123, 0]));
            assert!(sink.0.contains(&vec![0xB0 | channel, 121, 0]));
        }
    }
}
