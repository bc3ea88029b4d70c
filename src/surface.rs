//! Launch Control XL layout (factory preset 1)
//!
//! Factory preset 1 transmits on channel index 8 (status 0x98 for a press),
//! preset 2 on channel index 9, and so on. Only preset 1 is supported.

/// Status byte of a button press: note on, channel index 8
pub const PRESSED_STATUS: u8 = 0x98;

/// Velocity sent by a fully pressed button
pub const FULL_VELOCITY: u8 = 0x7F;

/// Mute modifier button
pub const MUTE_ID: u8 = 0x6A;

/// Solo modifier button
pub const SOLO_ID: u8 = 0x6B;

/// Record-arm modifier button
pub const REC_ARM_ID: u8 = 0x6C;

/// Data byte that advances the session counter
pub const SESSION_MARKER: u8 = 0x45;

/// Note offset between stacked modifier layers
pub const LAYER_STRIDE: u8 = 4;

/// Track-focus buttons, one per track, left to right
pub const TRACK_FOCUS_NOTES: [u8; 8] = [41, 42, 43, 44, 57, 58, 59, 60];

/// Track-control buttons, one per track, left to right
pub const TRACK_CONTROL_NOTES: [u8; 8] = [73, 74, 75, 76, 89, 90, 91, 92];

/// Track-control note that the solo/mute rule reacts to (track 1)
pub const SOLO_MUTE_NOTE: u8 = TRACK_CONTROL_NOTES[0];

/// Latching modifier buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Mute,
    Solo,
    RecArm,
}

impl Modifier {
    /// Layering order used by the track-focus translation
    pub const ORDER: [Modifier; 3] = [Modifier::Mute, Modifier::Solo, Modifier::RecArm];

    /// Controller / note number of the physical button
    pub fn control_id(self) -> u8 {
        match self {
            Modifier::Mute => MUTE_ID,
            Modifier::Solo => SOLO_ID,
            Modifier::RecArm => REC_ARM_ID,
        }
    }

    /// Modifier bound to a data byte, if any
    pub fn from_control_id(id: u8) -> Option<Self> {
        Self::ORDER.into_iter().find(|m| m.control_id() == id)
    }
}

/// Index (0-7) of the track whose focus button sends `note`
pub fn track_focus_index(note: u8) -> Option<usize> {
    TRACK_FOCUS_NOTES.iter().position(|&n| n == note)
}
