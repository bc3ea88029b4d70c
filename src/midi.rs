//! MIDI decoding and formatting
//!
//! Classifies raw byte buffers into a structured view and renders them for
//! diagnostics. Decoding borrows the input buffer and never allocates.

use std::fmt;

use crate::error::MalformedEventError;

/// Message class, taken from the high nibble of the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    ControlChange,
    /// Any 0xF_ status; the payload is opaque
    SystemExclusive,
    Other,
}

impl MessageKind {
    /// Classify a status byte
    pub fn from_status(status: u8) -> Self {
        match status >> 4 {
            0x9 => MessageKind::NoteOn,
            0x8 => MessageKind::NoteOff,
            0xB => MessageKind::ControlChange,
            0xF => MessageKind::SystemExclusive,
            _ => MessageKind::Other,
        }
    }

    /// Kinds that must carry exactly three bytes
    pub fn is_channel_message(self) -> bool {
        matches!(
            self,
            MessageKind::NoteOn | MessageKind::NoteOff | MessageKind::ControlChange
        )
    }

    fn prefix(self) -> &'static str {
        match self {
            MessageKind::NoteOn => "+  ",
            MessageKind::NoteOff => "-  ",
            MessageKind::ControlChange => "CC ",
            MessageKind::SystemExclusive => "SX ",
            MessageKind::Other => "",
        }
    }
}

/// Structured view over a raw MIDI buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEvent<'a> {
    pub kind: MessageKind,
    /// Raw status byte (type nibble + channel nibble)
    pub status: u8,
    /// Channel index 0-15
    pub channel: u8,
    /// Note or controller number (byte 1); also set for system exclusive
    pub data1: Option<u8>,
    /// Velocity or value (byte 2)
    pub data2: Option<u8>,
    /// The buffer this view was decoded from
    pub raw: &'a [u8],
}

/// Decode a raw buffer
///
/// Note on, note off and control change must be exactly 3 bytes long. System
/// exclusive and unknown kinds are passed through without further checks; their
/// bytes 1 and 2 are still exposed so the modifier latch and the session
/// counter see them like any other event.
pub fn decode(bytes: &[u8]) -> Result<DecodedEvent<'_>, MalformedEventError> {
    let status = *bytes.first().ok_or(MalformedEventError::Empty)?;
    let kind = MessageKind::from_status(status);

    if kind.is_channel_message() && bytes.len() != 3 {
        return Err(MalformedEventError::WrongLength {
            status,
            len: bytes.len(),
        });
    }

    Ok(DecodedEvent {
        kind,
        status,
        channel: status & 0x0F,
        data1: bytes.get(1).copied(),
        data2: bytes.get(2).copied(),
        raw: bytes,
    })
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable rendering of a raw buffer
///
/// `+  {0x98} [c 9] 0x29[ 41] 0x7f[127]`: kind prefix, status, 1-based
/// channel, then every data byte in hex and decimal.
pub struct Describe<'a>(pub &'a [u8]);

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(&status) = self.0.first() else {
            return write!(f, "empty event");
        };

        let kind = MessageKind::from_status(status);
        match kind {
            MessageKind::Other => write!(f, "{:#x}:", status & 0xF0)?,
            _ => write!(f, "{}", kind.prefix())?,
        }
        write!(f, "{{{:#x}}} [c{:2}]", status, (status & 0x0F) + 1)?;

        for (i, byte) in self.0.iter().enumerate().skip(1) {
            if i < 3 {
                write!(f, " 0x{:02x}[{:3}]", byte, byte)?;
            } else {
                write!(f, " {:#x}[{}]", byte, byte)?;
            }
        }
        Ok(())
    }
}
