//! Offline replay of captured MIDI traffic
//!
//! A capture is plain text, one event per line:
//!
//! ```text
//! # hold mute, press track 1 focus
//! 0: 98 6A 7F
//! 12: 98 29 7F
//! 98 29 00
//! ```
//!
//! An optional `<position>:` prefix sets the frame offset (default 0). All
//! lines form a single block run through a fresh translator.

use anyhow::{bail, Context, Result};
use colored::*;
use std::path::Path;

use crate::midi::Describe;
use crate::sink::{Emitted, VecSink};
use crate::translator::{EventOutcome, ModifierState, RawEvent, Translator};

/// One parsed capture line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub position: u32,
    pub bytes: Vec<u8>,
}

/// Result of replaying one captured event
#[derive(Debug, Clone)]
pub struct ReplayStep {
    pub input: CapturedEvent,
    pub outcome: EventOutcome,
    pub output: Vec<Emitted>,
    /// Modifier latch after the event was handled
    pub modifiers: ModifierState,
}

/// Parse a capture line; `Ok(None)` for blank and comment lines
pub fn parse_line(line: &str) -> Result<Option<CapturedEvent>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (position, hex) = match line.split_once(':') {
        Some((pos, rest)) => {
            let position = pos
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid position '{}'", pos.trim()))?;
            (position, rest)
        }
        None => (0, line),
    };

    let bytes = hex
        .split_whitespace()
        .map(|token| {
            let token = token.trim_start_matches("0x").trim_start_matches("0X");
            u8::from_str_radix(token, 16).with_context(|| format!("invalid hex byte '{}'", token))
        })
        .collect::<Result<Vec<u8>>>()?;

    if bytes.is_empty() {
        bail!("no bytes after position {}", position);
    }

    Ok(Some(CapturedEvent { position, bytes }))
}

/// Parse a whole capture, reporting the failing line number
pub fn parse_capture(text: &str) -> Result<Vec<CapturedEvent>> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(event) =
            parse_line(line).with_context(|| format!("line {}: '{}'", index + 1, line))?
        {
            events.push(event);
        }
    }
    Ok(events)
}

/// Run captured events through a fresh translator
pub fn replay(events: &[CapturedEvent]) -> Vec<ReplayStep> {
    let mut translator = Translator::new();
    let mut sink = VecSink::new();

    events
        .iter()
        .map(|event| {
            sink.clear();
            let outcome =
                translator.process_event(RawEvent::new(event.position, &event.bytes), &mut sink);
            ReplayStep {
                input: event.clone(),
                outcome,
                output: sink.events().to_vec(),
                modifiers: *translator.modifiers(),
            }
        })
        .collect()
}

/// Replay a capture file and print every input with its emissions
pub async fn run_replay(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read capture file: {}", path.display()))?;
    let events = parse_capture(&text)
        .with_context(|| format!("Failed to parse capture file: {}", path.display()))?;

    println!("\n{}", "=== Replay ===".bold().cyan());
    println!("{} event(s) from {}\n", events.len(), path.display());

    let mut total_out = 0;
    let mut total_muted = 0;
    for step in replay(&events) {
        let held = step.modifiers.active_count();
        println!(
            "  ——› @{:<4} {}  {}",
            step.input.position,
            Describe(&step.input.bytes).to_string().bright_white(),
            format!("[held {}]", held).dimmed()
        );
        if let Some(err) = step.outcome.malformed {
            println!("        {}", err.to_string().yellow());
        }
        if step.outcome.muted {
            println!("        {}", "MUTED track 1".magenta());
            total_muted += 1;
        }
        for out in &step.output {
            println!(
                "  ‹—— @{:<4} {}",
                out.position,
                Describe(&out.bytes).to_string().green()
            );
        }
        total_out += step.output.len();
    }

    println!(
        "\n{} input event(s) -> {} output event(s), {} muted",
        events.len(),
        total_out,
        total_muted
    );
    Ok(())
}
