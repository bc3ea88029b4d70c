//! Track-focus layering
//!
//! A full-velocity press of a track-focus button while modifiers are held
//! emits one copy of the press per held modifier. Copies are taken in
//! mute, solo, record-arm order and each one shifts the note by
//! [`LAYER_STRIDE`], so the offset reflects how many held modifiers precede
//! it in that order rather than which modifier it belongs to.

use super::draft::EventDraft;
use super::modifiers::ModifierState;
use crate::midi::DecodedEvent;
use crate::surface::{self, Modifier, FULL_VELOCITY, LAYER_STRIDE, PRESSED_STATUS};

/// Whether `event` is a full-velocity press of a track-focus button
pub fn is_trigger(event: &DecodedEvent<'_>) -> bool {
    event.status == PRESSED_STATUS
        && event.data2 == Some(FULL_VELOCITY)
        && event
            .data1
            .is_some_and(|note| surface::track_focus_index(note).is_some())
}

/// Emit the layered copies and leave the draft on the accumulated note
///
/// Returns the number of copies handed to `emit` (0-3).
pub fn handle<F>(
    event: &DecodedEvent<'_>,
    modifiers: &ModifierState,
    draft: &mut EventDraft<'_>,
    mut emit: F,
) -> usize
where
    F: FnMut(&EventDraft<'_>),
{
    if !is_trigger(event) {
        return 0;
    }
    let Some(mut note) = draft.note() else {
        return 0;
    };

    let mut emitted = 0;
    for modifier in Modifier::ORDER {
        if modifiers.is_active(modifier) {
            draft.set_note(note);
            emit(&*draft);
            note = note.wrapping_add(LAYER_STRIDE);
            emitted += 1;
        }
    }
    draft.set_note(note);

    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::decode;

    fn run(bytes: &[u8], modifiers: ModifierState) -> (Vec<Vec<u8>>, Vec<u8>) {
        let decoded = decode(bytes).unwrap();
        let mut draft = EventDraft::from_decoded(0, &decoded);
        let mut out = Vec::new();

        let count = handle(&decoded, &modifiers, &mut draft, |d| {
            out.push(d.bytes().to_vec())
        });
        assert_eq!(count, out.len());

        (out, draft.bytes().to_vec())
    }

    fn held(mute: bool, solo: bool, rec_arm: bool) -> ModifierState {
        ModifierState {
            mute,
            solo,
            rec_arm,
        }
    }

    #[test]
    fn test_no_modifiers_no_copies() {
        let (out, final_bytes) = run(&[0x98, 41, 0x7F], held(false, false, false));
        assert!(out.is_empty());
        assert_eq!(final_bytes, vec![0x98, 41, 0x7F]);
    }

    #[test]
    fn test_mute_and_solo_layers() {
        let (out, final_bytes) = run(&[0x98, 42, 0x7F], held(true, true, false));
        assert_eq!(out, vec![vec![0x98, 42, 0x7F], vec![0x98, 46, 0x7F]]);
        assert_eq!(final_bytes, vec![0x98, 50, 0x7F]);
    }

    #[test]
    fn test_all_three_layers() {
        let (out, final_bytes) = run(&[0x98, 60, 0x7F], held(true, true, true));
        assert_eq!(
            out,
            vec![
                vec![0x98, 60, 0x7F],
                vec![0x98, 64, 0x7F],
                vec![0x98, 68, 0x7F]
            ]
        );
        assert_eq!(final_bytes, vec![0x98, 72, 0x7F]);
    }

    #[test]
    fn test_offset_is_positional_not_per_modifier() {
        // A lone solo and a lone record-arm both land on the base note
        let (solo_only, _) = run(&[0x98, 57, 0x7F], held(false, true, false));
        let (rec_only, _) = run(&[0x98, 57, 0x7F], held(false, false, true));
        assert_eq!(solo_only, rec_only);
        assert_eq!(solo_only, vec![vec![0x98, 57, 0x7F]]);
    }

    #[test]
    fn test_requires_full_velocity() {
        let (out, final_bytes) = run(&[0x98, 41, 0x40], held(true, true, true));
        assert!(out.is_empty());
        assert_eq!(final_bytes, vec![0x98, 41, 0x40]);
    }

    #[test]
    fn test_requires_pressed_status() {
        let (out, _) = run(&[0x90, 41, 0x7F], held(true, false, false));
        assert!(out.is_empty());

        let (out, _) = run(&[0x88, 41, 0x7F], held(true, false, false));
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_focus_note_ignored() {
        let (out, final_bytes) = run(&[0x98, 73, 0x7F], held(true, true, true));
        assert!(out.is_empty());
        assert_eq!(final_bytes, vec![0x98, 73, 0x7F]);
    }
}
