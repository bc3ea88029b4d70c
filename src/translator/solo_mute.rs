//! Solo + track-1 control press mutes the forwarded event

use super::draft::EventDraft;
use super::modifiers::ModifierState;
use crate::midi::DecodedEvent;
use crate::surface::{FULL_VELOCITY, PRESSED_STATUS, SOLO_MUTE_NOTE};

/// Note the draft is rewritten to once the rule fires
pub const MUTED_NOTE: u8 = 0;

pub fn is_trigger(event: &DecodedEvent<'_>, modifiers: &ModifierState) -> bool {
    modifiers.solo
        && event.status == PRESSED_STATUS
        && event.data1 == Some(SOLO_MUTE_NOTE)
        && event.data2 == Some(FULL_VELOCITY)
}

/// Emit the draft as-is, then rewrite its note to [`MUTED_NOTE`]
///
/// Returns whether the rule fired.
pub fn apply<F>(
    event: &DecodedEvent<'_>,
    modifiers: &ModifierState,
    draft: &mut EventDraft<'_>,
    mut emit: F,
) -> bool
where
    F: FnMut(&EventDraft<'_>),
{
    if !is_trigger(event, modifiers) {
        return false;
    }

    emit(&*draft);
    draft.set_note(MUTED_NOTE);
    true
}
