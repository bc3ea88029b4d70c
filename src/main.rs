//! LCXL GW - Launch Control XL modifier-layer proxy
//!
//! Translates Launch Control XL traffic between the hardware and a host
//! application over JACK or native MIDI ports.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lcxl_gw::config::{AppConfig, Backend};
use lcxl_gw::{host, replay};

/// LCXL Gateway - layered track-focus events for the Launch Control XL
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, env = "LCXL_CONFIG")]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// MIDI backend, overrides the configuration file
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Log every incoming and outgoing event (at debug level)
    #[arg(long)]
    monitor: bool,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Replay a text capture through the translator and exit
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Write the effective configuration (file + overrides) as YAML and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    init_logging(&args.log_level, args.monitor)?;

    if args.list_ports {
        host::list_ports_formatted();
        return Ok(());
    }

    if let Some(path) = &args.replay {
        return replay::run_replay(path).await;
    }

    info!("Starting LCXL GW...");

    let mut config = AppConfig::load_or_default(args.config.as_deref()).await?;
    match &args.config {
        Some(path) => info!("Configuration file: {}", path),
        None => info!("No configuration file given, using defaults"),
    }

    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if args.monitor {
        config.monitor.enabled = true;
    }

    if let Some(path) = &args.write_config {
        config.save(path).await?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    host::run(&config, shutdown_signal()).await?;

    info!("LCXL GW shutdown complete");
    Ok(())
}

/// Log filter from `RUST_LOG` or `level`
///
/// Monitor records are logged at debug level, so monitoring always enables
/// debug output for this crate whatever the base level is.
fn build_filter(level: &str, monitor: bool) -> Result<EnvFilter> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if monitor {
        Ok(filter.add_directive("lcxl_gw=debug".parse()?))
    } else {
        Ok(filter)
    }
}

fn init_logging(level: &str, monitor: bool) -> Result<()> {
    let filter = build_filter(level, monitor)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

/// Resolves on Ctrl+C, or SIGHUP on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let hangup = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::hangup())
            .expect("Failed to install SIGHUP signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let hangup = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = hangup => {}
    }
}
