//! Error types for the translation core
//!
//! Both error types are `Copy` so they can be produced and inspected inside
//! the real-time process callback without allocating.

use thiserror::Error;

/// A raw event could not be decoded into a structured MIDI message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    /// Zero-length buffer
    #[error("empty MIDI event")]
    Empty,

    /// Channel message (note on/off, control change) without exactly 3 bytes
    #[error("malformed channel message: status {status:#04x} with {len} bytes (expected 3)")]
    WrongLength { status: u8, len: usize },
}

/// The output collaborator refused a single emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// No room left in the output buffer for this block
    #[error("output buffer full")]
    BufferFull,

    /// The underlying port or connection rejected the message
    #[error("output backend rejected the event")]
    Backend,
}
