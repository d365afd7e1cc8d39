// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Pushpluck Daemon - Push 1 fretted instrument service
//!
//! This is the main entry point. It parses command-line arguments, opens
//! the controller and processed ports, and runs the blocking event loop
//! until Ctrl-C. On the way out it drains all sounding notes and resets
//! the controller surface.

use clap::Parser;
use colored::Colorize;
use pushpluck_core::{
    ColorScheme, Config, Palette, Plucked, PushEvent, PushPorts, StartupOptions, constants,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// How long the event loop blocks before re-checking the shutdown flag
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Pushpluck - play an Ableton Push 1 as a fretted string instrument
///
/// Consumes the Push 1 user port, simulates strings and frets on the pad
/// grid (with per-string choke, hammer-ons and pull-offs), and emits the
/// processed notes on a virtual MIDI port other software can record or
/// synthesize from.
#[derive(Parser, Debug)]
#[command(name = "pushpluck")]
#[command(version)]
#[command(about = "Pushpluck - Push 1 fretted instrument service", long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error
    ///
    /// Can also be controlled via the RUST_LOG environment variable.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Minimum delay between messages to the Push, in seconds
    ///
    /// The Push drops traffic when flooded; don't lower this without a
    /// reason.
    #[arg(long, value_name = "SECS", default_value_t = 0.0008)]
    push_delay: f64,

    /// Name of the Push 1 user port
    #[arg(long, value_name = "NAME", default_value = constants::DEFAULT_PUSH_PORT_NAME)]
    push_port: String,

    /// Name of the virtual output port carrying processed notes
    #[arg(long, value_name = "NAME", default_value = constants::DEFAULT_PROCESSED_PORT_NAME)]
    processed_port: String,

    /// Velocity floor: nonzero incoming velocities are raised to this
    #[arg(long, value_name = "VEL")]
    min_velocity: Option<u8>,

    /// Path to a startup options file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to a palette file (pairs of lines: #RRGGBB then a name)
    #[arg(long, value_name = "FILE")]
    colors: Option<PathBuf>,

    /// List available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() {
    let args = Args::parse();
    setup_logging(&args.log_level);

    info!("pushpluck starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if args.list_ports {
        if let Err(e) = list_ports() {
            error!("Failed to list ports: {}", e);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run(&args) {
        error!("Fatal: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    info!("done");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    // Build the initial config: defaults, then the options file, then CLI
    // flags on top
    let mut config = Config::init(0);
    if let Some(path) = &args.config {
        info!("Options file: {}", path.display());
        config = StartupOptions::load(path)?.apply(config)?;
    }
    if let Some(min_velocity) = args.min_velocity {
        config.min_velocity = min_velocity;
    }

    let palette = match &args.colors {
        Some(path) => {
            info!("Palette file: {}", path.display());
            Palette::load(path)?
        }
        None => Palette::default(),
    };
    let scheme = ColorScheme::default_from_palette(&palette)?;

    info!("opening ports");
    let ports = PushPorts::open(
        &args.push_port,
        &args.processed_port,
        Duration::from_secs_f64(args.push_delay),
    )?;
    info!("opened ports");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::Relaxed);
        })?;
    }

    let PushPorts { midi_in, midi_out, midi_processed } = ports;
    let mut plucked = Plucked::new(
        Box::new(midi_out),
        Box::new(midi_processed),
        scheme,
        config,
    );

    // Start from a clean slate
    plucked.startup()?;
    info!("ready");

    while running.load(Ordering::Relaxed) {
        match midi_in.recv_timeout(RECV_TIMEOUT)? {
            Some(raw) => {
                if let Some(event) = PushEvent::decode(&raw) {
                    plucked.handle_event(&event)?;
                }
            }
            None => continue,
        }
    }

    // End with a clean slate too: notes off, display dark
    plucked.shutdown()?;
    Ok(())
}

/// Print available MIDI ports, for picking a --push-port value
fn list_ports() -> Result<(), Box<dyn std::error::Error>> {
    use midir::{MidiInput, MidiOutput};

    let midi_in = MidiInput::new("pushpluck scanner")?;
    println!("{}", "Available MIDI input ports:".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    let in_ports = midi_in.ports();
    for (i, port) in in_ports.iter().enumerate() {
        let name = midi_in.port_name(port)?;
        println!("  {} {}", format!("[{i}]").cyan(), name);
    }
    if in_ports.is_empty() {
        println!("  {}", "No MIDI input ports found!".red());
    }

    let midi_out = MidiOutput::new("pushpluck scanner")?;
    println!();
    println!("{}", "Available MIDI output ports:".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    let out_ports = midi_out.ports();
    for (i, port) in out_ports.iter().enumerate() {
        let name = midi_out.port_name(port)?;
        println!("  {} {}", format!("[{i}]").cyan(), name);
    }
    if out_ports.is_empty() {
        println!("  {}", "No MIDI output ports found!".red());
    }

    Ok(())
}

/// Setup logging with tracing-subscriber
fn setup_logging(log_level: &str) {
    // Pushpluck crates at the requested level, everything else at WARN
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pushpluck={log_level},pushpluck_core={log_level},pushpluck_daemon={log_level},warn"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();
}
