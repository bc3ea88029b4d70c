//! Event translation pipeline
//!
//! Every incoming event runs through the same fixed sequence:
//!
//! 1. decode ([`crate::midi::decode`])
//! 2. latch modifier state ([`modifiers`])
//! 3. track-focus layering ([`track_focus`]), 0-3 emissions
//! 4. solo/mute override ([`solo_mute`]), 0-1 emission
//! 5. session counter ([`session`])
//! 6. forward the draft in whatever state the rules left it, always 1 emission
//!
//! All emissions for one input share its block position. Nothing here
//! allocates, blocks or logs, so it is safe to call from a real-time callback.

pub mod draft;
pub mod modifiers;
pub mod session;
pub mod solo_mute;
pub mod track_focus;

pub use draft::{EventDraft, RawEvent};
pub use modifiers::ModifierState;
pub use session::SessionCounter;

use crate::error::{MalformedEventError, SinkError};
use crate::midi::decode;
use crate::sink::EventSink;

/// What happened to a single input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Emissions the sink accepted
    pub emitted: usize,
    /// Emissions the sink refused
    pub rejected: usize,
    /// Copies produced by track-focus layering
    pub layers: usize,
    /// Solo/mute override fired
    pub muted: bool,
    /// Session marker seen
    pub session_marker: bool,
    /// Decode failure; rules were skipped
    pub malformed: Option<MalformedEventError>,
    /// Last sink refusal
    pub sink_error: Option<SinkError>,
}

impl EventOutcome {
    fn record(&mut self, result: Result<(), SinkError>) {
        match result {
            Ok(()) => self.emitted += 1,
            Err(e) => {
                self.rejected += 1;
                self.sink_error = Some(e);
            }
        }
    }
}

/// Totals for one processing block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub events: usize,
    pub emitted: usize,
    pub rejected: usize,
    pub malformed: usize,
    /// Events whose forward was rewritten by the solo/mute override
    pub muted: usize,
}

impl BlockReport {
    pub fn add(&mut self, outcome: &EventOutcome) {
        self.events += 1;
        self.emitted += outcome.emitted;
        self.rejected += outcome.rejected;
        if outcome.malformed.is_some() {
            self.malformed += 1;
        }
        if outcome.muted {
            self.muted += 1;
        }
    }
}

/// Re-emit the draft as it currently stands
pub fn forward<S: EventSink + ?Sized>(
    draft: &EventDraft<'_>,
    sink: &mut S,
) -> Result<(), SinkError> {
    sink.emit(draft.position(), draft.bytes())
}

/// Stateful translator for one control surface
///
/// Owns the modifier latch; the session counter handle may be shared with a
/// reader on another thread.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    modifiers: ModifierState,
    session: SessionCounter,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator that advances an existing counter
    pub fn with_session_counter(session: SessionCounter) -> Self {
        Self {
            modifiers: ModifierState::new(),
            session,
        }
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn session(&self) -> &SessionCounter {
        &self.session
    }

    /// Translate one event, emitting everything it produces into `sink`
    ///
    /// Malformed events skip every rule and are forwarded byte-for-byte;
    /// empty buffers are dropped. A refused emission is recorded in the
    /// outcome and does not stop the remaining ones.
    pub fn process_event<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent<'_>,
        sink: &mut S,
    ) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        let decoded = match decode(event.bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                outcome.malformed = Some(e);
                if e != MalformedEventError::Empty {
                    outcome.record(forward(&EventDraft::passthrough(event), sink));
                }
                return outcome;
            }
        };

        self.modifiers.update(&decoded);

        let mut draft = EventDraft::from_decoded(event.position, &decoded);

        let layers = track_focus::handle(&decoded, &self.modifiers, &mut draft, |d| {
            outcome.record(forward(d, sink))
        });
        let muted = solo_mute::apply(&decoded, &self.modifiers, &mut draft, |d| {
            outcome.record(forward(d, sink))
        });
        outcome.layers = layers;
        outcome.muted = muted;

        outcome.session_marker = self.session.observe(&decoded);

        outcome.record(forward(&draft, sink));
        outcome
    }

    /// Translate a block of events
    ///
    /// Events must arrive in non-decreasing position order; they are handled
    /// strictly one after another.
    pub fn process_block<'a, I, S>(&mut self, events: I, sink: &mut S) -> BlockReport
    where
        I: IntoIterator<Item = RawEvent<'a>>,
        S: EventSink + ?Sized,
    {
        let mut report = BlockReport::default();
        for event in events {
            let outcome = self.process_event(event, sink);
            report.add(&outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Emitted, VecSink};

    fn press(note: u8) -> [u8; 3] {
        [0x98, note, 0x7F]
    }

    fn release(note: u8) -> [u8; 3] {
        [0x88, note, 0x00]
    }

    fn bytes_of(sink: &VecSink) -> Vec<Vec<u8>> {
        sink.events().iter().map(|e| e.bytes.clone()).collect()
    }

    struct RejectingSink {
        accept_first: usize,
        seen: usize,
    }

    impl EventSink for RejectingSink {
        fn emit(&mut self, _position: u32, _bytes: &[u8]) -> Result<(), SinkError> {
            self.seen += 1;
            if self.seen > self.accept_first {
                Err(SinkError::BufferFull)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_plain_event_forwarded_once() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        let outcome = translator.process_event(RawEvent::new(7, &press(41)), &mut sink);

        assert_eq!(outcome.emitted, 1);
        assert_eq!(outcome.layers, 0);
        assert_eq!(
            sink.events(),
            &[Emitted {
                position: 7,
                bytes: vec![0x98, 41, 0x7F]
            }]
        );
    }

    #[test]
    fn test_mute_solo_layering_end_to_end() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        translator.process_event(RawEvent::new(0, &press(0x6A)), &mut sink);
        translator.process_event(RawEvent::new(0, &press(0x6B)), &mut sink);
        sink.clear();

        let outcome = translator.process_event(RawEvent::new(3, &press(43)), &mut sink);

        assert_eq!(outcome.layers, 2);
        assert_eq!(
            bytes_of(&sink),
            vec![
                vec![0x98, 43, 0x7F],
                vec![0x98, 47, 0x7F],
                vec![0x98, 51, 0x7F]
            ]
        );
        assert!(sink.events().iter().all(|e| e.position == 3));
    }

    #[test]
    fn test_solo_mute_override_end_to_end() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        translator.process_event(RawEvent::new(0, &press(0x6B)), &mut sink);
        sink.clear();

        let outcome = translator.process_event(RawEvent::new(0, &press(73)), &mut sink);

        assert!(outcome.muted);
        assert_eq!(
            bytes_of(&sink),
            vec![vec![0x98, 73, 0x7F], vec![0x98, 0, 0x7F]]
        );
    }

    #[test]
    fn test_modifier_press_itself_is_forwarded() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        translator.process_event(RawEvent::new(0, &press(0x6C)), &mut sink);
        translator.process_event(RawEvent::new(1, &release(0x6C)), &mut sink);

        assert_eq!(bytes_of(&sink), vec![press(0x6C).to_vec(), release(0x6C).to_vec()]);
        assert!(!translator.modifiers().rec_arm);
    }

    #[test]
    fn test_malformed_forwarded_without_state_change() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        let outcome = translator.process_event(RawEvent::new(2, &[0x98, 0x6A]), &mut sink);

        assert!(matches!(
            outcome.malformed,
            Some(MalformedEventError::WrongLength { status: 0x98, len: 2 })
        ));
        assert_eq!(bytes_of(&sink), vec![vec![0x98, 0x6A]]);
        assert_eq!(*translator.modifiers(), ModifierState::default());
    }

    #[test]
    fn test_empty_event_dropped() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        let outcome = translator.process_event(RawEvent::new(0, &[]), &mut sink);

        assert_eq!(outcome.malformed, Some(MalformedEventError::Empty));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_session_marker_counts_without_extra_emission() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        let outcome = translator.process_event(RawEvent::new(0, &[0xB3, 0x45, 0x10]), &mut sink);

        assert!(outcome.session_marker);
        assert_eq!(translator.session().get(), 1);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_rejections_do_not_stop_later_emissions() {
        let mut translator = Translator::new();
        let mut setup = VecSink::new();
        translator.process_event(RawEvent::new(0, &press(0x6A)), &mut setup);
        translator.process_event(RawEvent::new(0, &press(0x6B)), &mut setup);

        let mut sink = RejectingSink {
            accept_first: 1,
            seen: 0,
        };
        let outcome = translator.process_event(RawEvent::new(0, &press(41)), &mut sink);

        assert_eq!(sink.seen, 3);
        assert_eq!(outcome.emitted, 1);
        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.sink_error, Some(SinkError::BufferFull));
    }

    #[test]
    fn test_block_report_totals() {
        let mut translator = Translator::new();
        let mut sink = VecSink::new();

        let mute = press(0x6A);
        let focus = press(44);
        let short = [0x98, 44];
        let solo = press(0x6B);
        let control = press(73);
        let block = [
            RawEvent::new(0, &mute),
            RawEvent::new(4, &focus),
            RawEvent::new(9, &short),
            RawEvent::new(11, &solo),
            RawEvent::new(12, &control),
        ];

        let report = translator.process_block(block, &mut sink);

        assert_eq!(
            report,
            BlockReport {
                events: 5,
                emitted: 7,
                rejected: 0,
                malformed: 1,
                muted: 1
            }
        );
        let positions: Vec<u32> = sink.events().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 4, 4, 9, 11, 12, 12]);
    }
}
