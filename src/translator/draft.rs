//! Incoming events and the working copy threaded through the rules

use crate::midi::DecodedEvent;

/// One incoming event of a processing block
///
/// Borrows the backend's buffer; the translator never takes ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent<'a> {
    /// Frame offset within the current block
    pub position: u32,
    pub bytes: &'a [u8],
}

impl<'a> RawEvent<'a> {
    pub fn new(position: u32, bytes: &'a [u8]) -> Self {
        Self { position, bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload<'a> {
    /// Three-byte channel message, copied so rules can rewrite the note
    Channel([u8; 3]),
    /// Anything else, forwarded exactly as received
    Opaque(&'a [u8]),
}

/// Working copy of one input event
///
/// Rules rewrite the note of the draft in place; whatever state the draft
/// ends in is what the final forward emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDraft<'a> {
    position: u32,
    payload: Payload<'a>,
}

impl<'a> EventDraft<'a> {
    /// Draft for a successfully decoded event
    pub fn from_decoded(position: u32, event: &DecodedEvent<'a>) -> Self {
        let payload = match event.raw {
            &[status, data1, data2] if event.kind.is_channel_message() => {
                Payload::Channel([status, data1, data2])
            }
            _ => Payload::Opaque(event.raw),
        };
        Self { position, payload }
    }

    /// Draft that forwards the raw bytes untouched
    pub fn passthrough(event: RawEvent<'a>) -> Self {
        Self {
            position: event.position,
            payload: Payload::Opaque(event.bytes),
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Current note (data1) of a channel message draft
    pub fn note(&self) -> Option<u8> {
        match self.payload {
            Payload::Channel(bytes) => Some(bytes[1]),
            Payload::Opaque(_) => None,
        }
    }

    /// Rewrite the note; no-op on opaque drafts
    pub fn set_note(&mut self, note: u8) {
        if let Payload::Channel(ref mut bytes) = self.payload {
            bytes[1] = note;
        }
    }

    /// Bytes as they would be emitted right now
    pub fn bytes(&self) -> &[u8] {
        match self.payload {
            Payload::Channel(ref bytes) => bytes,
            Payload::Opaque(bytes) => bytes,
        }
    }
}
