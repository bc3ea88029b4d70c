//! Output collaborator
//!
//! Backends implement [`EventSink`] to receive translated events. Every call
//! is one complete MIDI message placed at `position` within the current block.

use crate::error::SinkError;

/// Destination for translated events
pub trait EventSink {
    /// Deliver one message at `position`
    fn emit(&mut self, position: u32, bytes: &[u8]) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, position: u32, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).emit(position, bytes)
    }
}

/// A message captured by [`VecSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub position: u32,
    pub bytes: Vec<u8>,
}

/// Sink that records everything it receives
///
/// Allocates per message, so it is meant for replay and tests rather than
/// the process callback. An optional capacity makes it reject once full.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<Emitted>,
    capacity: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that accepts at most `capacity` messages
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn events(&self) -> &[Emitted] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Emitted> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, position: u32, bytes: &[u8]) -> Result<(), SinkError> {
        if self.capacity.is_some_and(|cap| self.events.len() >= cap) {
            return Err(SinkError::BufferFull);
        }
        self.events.push(Emitted {
            position,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
