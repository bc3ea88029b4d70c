//! JACK backend
//!
//! Registers the proxy's ports and runs the translator inside the JACK
//! process callback, one block at a time. Emissions are written to the
//! output port at the frame of the input event that produced them.

use anyhow::{Context, Result};
use jack::{
    AsyncClient, Client, ClientOptions, Control, MidiIn, MidiOut, MidiWriter, Port, PortFlags,
    ProcessHandler, ProcessScope, RawMidi,
};
use tracing::{info, warn};

use super::Engine;
use crate::config::AppConfig;
use crate::error::SinkError;
use crate::sink::EventSink;
use crate::translator::RawEvent;

/// Output port writer for the current block
struct JackSink<'w, 'a> {
    writer: &'w mut MidiWriter<'a>,
}

impl EventSink for JackSink<'_, '_> {
    fn emit(&mut self, position: u32, bytes: &[u8]) -> Result<(), SinkError> {
        self.writer
            .write(&RawMidi {
                time: position,
                bytes,
            })
            .map_err(|e| match e {
                jack::Error::NotEnoughSpace => SinkError::BufferFull,
                _ => SinkError::Backend,
            })
    }
}

/// Process callback state
struct ProxyHandler {
    input: Port<MidiIn>,
    output: Port<MidiOut>,
    /// Registered for patchbay compatibility only
    _aux_inputs: Vec<Port<MidiIn>>,
    aux_outputs: Vec<Port<MidiOut>>,
    engine: Engine,
}

impl ProcessHandler for ProxyHandler {
    fn process(&mut self, _client: &Client, ps: &ProcessScope) -> Control {
        // Taking a writer clears the port buffer for this block
        for port in &mut self.aux_outputs {
            let _ = port.writer(ps);
        }

        let mut writer = self.output.writer(ps);
        let events = self
            .input
            .iter(ps)
            .map(|midi| RawEvent::new(midi.time, midi.bytes));

        self.engine.run_block(
            events,
            JackSink {
                writer: &mut writer,
            },
        );

        Control::Continue
    }
}

/// Active JACK client
pub struct JackHost {
    client: AsyncClient<(), ProxyHandler>,
}

impl JackHost {
    /// Open the client, register ports and activate processing
    pub fn start(config: &AppConfig, engine: Engine) -> Result<Self> {
        let (client, status) = Client::new(&config.client_name, ClientOptions::NO_START_SERVER)
            .context("Could not create JACK client (is the JACK server running?)")?;
        info!(
            "JACK client '{}' opened ({} Hz, status {:?})",
            client.name(),
            client.sample_rate(),
            status
        );

        let ports = &config.ports;
        let input = client
            .register_port(&ports.input, MidiIn::default())
            .with_context(|| format!("Failed to register input port '{}'", ports.input))?;
        let output = client
            .register_port(&ports.output, MidiOut::default())
            .with_context(|| format!("Failed to register output port '{}'", ports.output))?;

        let mut aux_inputs = Vec::new();
        let mut aux_outputs = Vec::new();
        if ports.register_auxiliary {
            for name in [&ports.mmc_input, &ports.control_input] {
                aux_inputs.push(
                    client
                        .register_port(name, MidiIn::default())
                        .with_context(|| format!("Failed to register port '{}'", name))?,
                );
            }
            aux_outputs.push(
                client
                    .register_port(&ports.control_output, MidiOut::default())
                    .with_context(|| {
                        format!("Failed to register port '{}'", ports.control_output)
                    })?,
            );
        }

        let handler = ProxyHandler {
            input,
            output,
            _aux_inputs: aux_inputs,
            aux_outputs,
            engine,
        };

        let client = client
            .activate_async((), handler)
            .context("Could not activate JACK client")?;

        info!(
            "JACK ports ready: '{}' -> '{}'",
            ports.input, ports.output
        );

        Ok(Self { client })
    }

    /// Deactivate and close the client
    pub fn stop(self) -> Result<()> {
        self.client
            .deactivate()
            .context("Could not deactivate JACK client")?;
        info!("JACK client closed");
        Ok(())
    }
}

/// Print JACK MIDI ports, or a note when no server is reachable
pub fn print_ports() {
    use colored::*;

    let client = match Client::new("lcxl-gw-scanner", ClientOptions::NO_START_SERVER) {
        Ok((client, _)) => client,
        Err(e) => {
            warn!("JACK server not reachable: {}", e);
            println!("\n{}", "JACK: server not running".dimmed());
            return;
        }
    };

    for (title, flags) in [
        ("JACK MIDI Sources:", PortFlags::IS_OUTPUT),
        ("JACK MIDI Destinations:", PortFlags::IS_INPUT),
    ] {
        println!("\n{}", title.bold());
        let ports = client.ports(None, Some("midi"), flags);
        if ports.is_empty() {
            println!("  {}", "No ports found".dimmed());
        }
        for port in ports {
            let marker = if port.starts_with("system:") {
                "[PHYSICAL]".green()
            } else {
                "[CLIENT]".yellow()
            };
            println!("  {} {}", marker, port);
        }
    }
}
