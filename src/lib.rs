//! LCXL GW - Launch Control XL modifier-layer proxy
//!
//! Sits between a Novation Launch Control XL and a host application and turns
//! track-focus presses made while mute, solo or record-arm are held into
//! layered MIDI events. The translation core ([`translator`]) is
//! allocation-free and runs inside a JACK process callback; [`host`] provides
//! the surrounding program.

pub mod config;
pub mod error;
pub mod host;
pub mod midi;
pub mod monitor;
pub mod replay;
pub mod sink;
pub mod stats;
pub mod surface;
pub mod translator;

pub use error::{MalformedEventError, SinkError};
pub use sink::{EventSink, VecSink};
pub use translator::{BlockReport, EventOutcome, RawEvent, Translator};
