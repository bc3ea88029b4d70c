//! Latched modifier state (mute, solo, record-arm)

use crate::midi::DecodedEvent;
use crate::surface::{Modifier, PRESSED_STATUS};

/// Current level of the three modifier buttons
///
/// A flag is set only while the most recent event for its button carried the
/// press status; any other status for that button clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub mute: bool,
    pub solo: bool,
    pub rec_arm: bool,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Mute => self.mute,
            Modifier::Solo => self.solo,
            Modifier::RecArm => self.rec_arm,
        }
    }

    /// Number of modifiers currently held
    pub fn active_count(&self) -> usize {
        Modifier::ORDER
            .into_iter()
            .filter(|&m| self.is_active(m))
            .count()
    }

    fn set(&mut self, modifier: Modifier, active: bool) {
        match modifier {
            Modifier::Mute => self.mute = active,
            Modifier::Solo => self.solo = active,
            Modifier::RecArm => self.rec_arm = active,
        }
    }

    /// Latch from a decoded event
    ///
    /// Applies to every message kind whose data1 names a modifier button.
    pub fn update(&mut self, event: &DecodedEvent<'_>) {
        if let Some(modifier) = event.data1.and_then(Modifier::from_control_id) {
            self.set(modifier, event.status == PRESSED_STATUS);
        }
    }
}
