//! Session counter
//!
//! Free-running counter advanced by every event whose data1 is the session
//! marker. Purely diagnostic: routing never reads it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::midi::DecodedEvent;
use crate::surface::SESSION_MARKER;

/// Shared counter handle
///
/// The process callback increments it; the control loop reads it to log
/// session changes. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct SessionCounter {
    value: Arc<AtomicU64>,
}

impl SessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter if `event` carries the marker; returns whether it did
    pub fn observe(&self, event: &DecodedEvent<'_>) -> bool {
        if event.data1 == Some(SESSION_MARKER) {
            self.value.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decode;

    #[test]
    fn test_marker_on_any_channel() {
        let counter = SessionCounter::new();

        counter.observe(&decode(&[0x98, 0x45, 0x7F]).unwrap());
        counter.observe(&decode(&[0xB0, 0x45, 0x00]).unwrap());
        counter.observe(&decode(&[0x83, 0x45, 0x00]).unwrap());
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_marker_in_sysex() {
        let counter = SessionCounter::new();

        assert!(counter.observe(&decode(&[0xF0, 0x45, 0xF7]).unwrap()));
        assert!(!counter.observe(&decode(&[0xF0, 0x7F, 0x45, 0xF7]).unwrap()));
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_other_notes_ignored() {
        let counter = SessionCounter::new();
        assert!(!counter.observe(&decode(&[0x98, 0x44, 0x45]).unwrap()));
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_clones_share_value() {
        let counter = SessionCounter::new();
        let reader = counter.clone();

        counter.observe(&decode(&[0x98, 0x45, 0x7F]).unwrap());
        assert_eq!(reader.get(), 1);
    }
}
