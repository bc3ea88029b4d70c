//! Native MIDI backend (midir)
//!
//! For systems without JACK. Every incoming message is translated as a
//! one-event block at position 0 and sent straight to the output port.

use anyhow::{Context, Result};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use super::Engine;
use crate::config::AppConfig;
use crate::error::SinkError;
use crate::midi::format_hex;
use crate::sink::EventSink;
use crate::translator::RawEvent;

struct MidirSink<'c> {
    conn: &'c mut MidiOutputConnection,
}

impl EventSink for MidirSink<'_> {
    fn emit(&mut self, _position: u32, bytes: &[u8]) -> Result<(), SinkError> {
        self.conn.send(bytes).map_err(|e| {
            debug!("Failed to send {}: {}", format_hex(bytes), e);
            SinkError::Backend
        })
    }
}

/// Connected input and output ports
pub struct NativeHost {
    input_conn: MidiInputConnection<()>,
}

impl NativeHost {
    /// Connect to the configured ports and start translating
    pub fn start(config: &AppConfig, mut engine: Engine) -> Result<Self> {
        let mut midi_in = MidiInput::new(&config.client_name)
            .context("Failed to create MIDI input")?;
        // Don't ignore any messages - sysex and timing are forwarded too
        midi_in.ignore(Ignore::None);

        let (in_port, in_name) = find_input_port(&midi_in, &config.midir.input_port)
            .ok_or_else(|| {
                anyhow::anyhow!("Input port '{}' not found", config.midir.input_port)
            })?;

        let midi_out = MidiOutput::new(&config.client_name)
            .context("Failed to create MIDI output")?;
        let (out_port, out_name) = find_output_port(&midi_out, &config.midir.output_port)
            .ok_or_else(|| {
                anyhow::anyhow!("Output port '{}' not found", config.midir.output_port)
            })?;

        info!("Connecting to output port: {}", out_name);
        let mut output_conn = midi_out
            .connect(&out_port, "lcxl-gw-out")
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to connect to output port")?;

        info!("Connecting to input port: {}", in_name);
        let input_conn = midi_in
            .connect(
                &in_port,
                "lcxl-gw-in",
                move |_timestamp, data, _| {
                    let report = engine.run_block(
                        [RawEvent::new(0, data)],
                        MidirSink {
                            conn: &mut output_conn,
                        },
                    );
                    if report.rejected > 0 {
                        warn!("Output port rejected {} event(s)", report.rejected);
                    }
                },
                (),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to connect to input port")?;

        info!("Native MIDI proxy ready: '{}' -> '{}'", in_name, out_name);
        Ok(Self { input_conn })
    }

    /// Close both connections
    pub fn stop(self) {
        // The output connection lives in the input callback and closes with it
        let _ = self.input_conn.close();
        info!("Native MIDI ports disconnected");
    }
}

/// Find an input port by substring match
fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(midir::MidiInputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_in.ports().into_iter().find_map(|port| {
        let name = midi_in.port_name(&port).ok()?;
        name.to_lowercase()
            .contains(&pattern)
            .then_some((port, name))
    })
}

/// Find an output port by substring match
fn find_output_port(
    midi_out: &MidiOutput,
    pattern: &str,
) -> Option<(midir::MidiOutputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_out.ports().into_iter().find_map(|port| {
        let name = midi_out.port_name(&port).ok()?;
        name.to_lowercase()
            .contains(&pattern)
            .then_some((port, name))
    })
}

/// Print native MIDI ports
pub fn print_ports() {
    use colored::*;

    println!("\n{}", "Native Input Ports:".bold());
    match MidiInput::new("lcxl-gw-scanner") {
        Ok(midi_in) => {
            let names = midi_in
                .ports()
                .iter()
                .filter_map(|p| midi_in.port_name(p).ok())
                .collect();
            print_names(names);
        }
        Err(e) => println!("  {}", format!("unavailable: {}", e).dimmed()),
    }

    println!("\n{}", "Native Output Ports:".bold());
    match MidiOutput::new("lcxl-gw-scanner") {
        Ok(midi_out) => {
            let names = midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect();
            print_names(names);
        }
        Err(e) => println!("  {}", format!("unavailable: {}", e).dimmed()),
    }
}

fn print_names(names: Vec<String>) {
    use colored::*;

    if names.is_empty() {
        println!("  {}", "No ports found".dimmed());
    }
    for (index, name) in names.iter().enumerate() {
        let marker = if is_virtual(name) {
            "[VIRTUAL]".yellow()
        } else {
            "[PHYSICAL]".green()
        };
        println!("  {} {}: {}", marker, index, name);
    }
}

fn is_virtual(name: &str) -> bool {
    name.contains("Virtual") || name.contains("loopMIDI") || name.contains("IAC")
}
