//! Host program around the translator
//!
//! Owns the MIDI backend, moves a [`Translator`] into its callback and runs
//! the control loop that publishes diagnostics until shutdown.

#[cfg(feature = "jack")]
pub mod jack_backend;
pub mod native;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, Backend};
use crate::monitor::{Direction, EventMonitor, MonitoredSink};
use crate::sink::EventSink;
use crate::stats::{StatsSnapshot, TranslationStats};
use crate::translator::{BlockReport, RawEvent, SessionCounter, Translator};

/// Handles the process callback shares with the control loop
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub session: SessionCounter,
    pub stats: Arc<TranslationStats>,
    pub monitor: Option<Arc<EventMonitor>>,
}

impl Diagnostics {
    /// Diagnostics with an event monitor of `capacity` when given
    pub fn new(monitor_capacity: Option<usize>) -> Self {
        Self {
            session: SessionCounter::new(),
            stats: Arc::new(TranslationStats::new()),
            monitor: monitor_capacity.map(|cap| Arc::new(EventMonitor::new(cap))),
        }
    }
}

/// Translator plus diagnostics, driven once per block by a backend
pub struct Engine {
    translator: Translator,
    diagnostics: Diagnostics,
}

impl Engine {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            translator: Translator::with_session_counter(diagnostics.session.clone()),
            diagnostics,
        }
    }

    /// Translate one block into `sink`, feeding the monitor and counters
    pub fn run_block<'a, I, S>(&mut self, events: I, sink: S) -> BlockReport
    where
        I: IntoIterator<Item = RawEvent<'a>>,
        S: EventSink,
    {
        let monitor = self.diagnostics.monitor.as_deref();
        let mut sink = MonitoredSink::new(sink, monitor);
        let events = events.into_iter().inspect(|event| {
            if let Some(monitor) = monitor {
                monitor.record(Direction::Input, event.position, event.bytes);
            }
        });

        let report = self.translator.process_block(events, &mut sink);
        self.diagnostics.stats.record(&report);
        report
    }
}

/// A running backend
pub enum ActiveHost {
    #[cfg(feature = "jack")]
    Jack(jack_backend::JackHost),
    Native(native::NativeHost),
}

impl ActiveHost {
    /// Start the configured backend
    pub fn start(config: &AppConfig, diagnostics: Diagnostics) -> Result<Self> {
        match config.backend {
            #[cfg(feature = "jack")]
            Backend::Jack => Ok(ActiveHost::Jack(jack_backend::JackHost::start(
                config,
                Engine::new(diagnostics),
            )?)),
            #[cfg(not(feature = "jack"))]
            Backend::Jack => {
                anyhow::bail!("JACK backend requested but lcxl-gw was built without the 'jack' feature")
            }
            Backend::Midir => Ok(ActiveHost::Native(native::NativeHost::start(
                config,
                Engine::new(diagnostics),
            )?)),
        }
    }

    /// Deactivate / disconnect the backend
    pub fn stop(self) -> Result<()> {
        match self {
            #[cfg(feature = "jack")]
            ActiveHost::Jack(host) => host.stop(),
            ActiveHost::Native(host) => {
                host.stop();
                Ok(())
            }
        }
    }
}

/// Turns shared diagnostics into log lines on the control thread
pub struct Reporter {
    diagnostics: Diagnostics,
    last_session: u64,
    last_stats: StatsSnapshot,
}

impl Reporter {
    pub fn new(diagnostics: Diagnostics) -> Self {
        let last_session = diagnostics.session.get();
        let last_stats = diagnostics.stats.snapshot();
        Self {
            diagnostics,
            last_session,
            last_stats,
        }
    }

    /// Log everything that changed since the previous call and return the
    /// counter deltas that were logged
    pub fn publish(&mut self) -> StatsSnapshot {
        if let Some(monitor) = &self.diagnostics.monitor {
            for record in monitor.drain() {
                debug!("{}", record);
            }
            let dropped = monitor.take_dropped();
            if dropped > 0 {
                warn!("Event monitor overflowed, {} records dropped", dropped);
            }
        }

        let session = self.diagnostics.session.get();
        if session != self.last_session {
            info!("new session state: {}", session);
            self.last_session = session;
        }

        let stats = self.diagnostics.stats.snapshot();
        let delta = stats.since(&self.last_stats);
        if delta.muted > 0 {
            info!("MUTED track 1 ({} solo override(s))", delta.muted);
        }
        if delta.malformed > 0 {
            warn!(
                "{} malformed event(s) passed through untranslated",
                delta.malformed
            );
        }
        if delta.rejected > 0 {
            warn!("{} emission(s) rejected by the output port", delta.rejected);
        }
        self.last_stats = stats;
        delta
    }

    pub fn totals(&self) -> StatsSnapshot {
        self.diagnostics.stats.snapshot()
    }
}

/// Run the proxy until `shutdown` resolves
pub async fn run(config: &AppConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    let monitor_capacity = config.monitor.enabled.then_some(config.monitor.capacity);
    let diagnostics = Diagnostics::new(monitor_capacity);

    let host = ActiveHost::start(config, diagnostics.clone())?;
    info!("Proxy running with {:?} backend", config.backend);

    let mut reporter = Reporter::new(diagnostics);
    let mut ticker = tokio::time::interval(Duration::from_millis(config.report_interval_ms));

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                reporter.publish();
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping proxy");
                break;
            }
        }
    }

    host.stop()?;
    reporter.publish();

    let totals = reporter.totals();
    info!(
        "Processed {} event(s) in {} block(s): {} emitted, {} rejected, {} malformed, {} muted",
        totals.events,
        totals.blocks,
        totals.emitted,
        totals.rejected,
        totals.malformed,
        totals.muted
    );

    Ok(())
}

/// Print available ports for every compiled-in backend
pub fn list_ports_formatted() {
    use colored::*;

    println!("\n{}", "=== Available MIDI Ports ===".bold().cyan());

    #[cfg(feature = "jack")]
    jack_backend::print_ports();

    native::print_ports();

    println!();
}
