//! Watts-RMS Agent CLI
//!
//! Reads metric samples as JSON lines on stdin, tracks per-source peaks,
//! and emits one Watts-RMS reading per source on stdout every read cycle.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use watts_rms_agent::{
    config::{Config, TargetConfig},
    core::watts_from_peak,
    dispatch::{Dispatch, JsonLineDispatcher},
    sample::feed,
    stats::{create_shared_stats_with_persistence, AgentStats},
    WattsRmsPlugin, PowerReading, VERSION,
};

#[derive(Parser)]
#[command(name = "watts-rms")]
#[command(version = VERSION)]
#[command(about = "CT-clamp power monitoring agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent: samples in on stdin, readings out on stdout
    Run {
        /// Seconds between read cycles (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Burden resistance in ohms for a single ad-hoc target
        #[arg(long)]
        burden: Option<f64>,

        /// Nominal AC line voltage for a single ad-hoc target
        #[arg(long)]
        ac_volts: Option<f64>,
    },

    /// Show cumulative agent statistics
    Status,

    /// Show the effective configuration
    Config,

    /// Convert a single peak reading (calibration aid)
    Convert {
        /// Peak sample in millivolts
        #[arg(long)]
        peak: f64,

        /// Burden resistance in ohms (0 skips the division)
        #[arg(long, default_value_t = 0.0)]
        burden: f64,

        /// Nominal AC line voltage
        #[arg(long, default_value_t = 120.0)]
        ac_volts: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            interval,
            burden,
            ac_volts,
        } => {
            cmd_run(interval, burden, ac_volts);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
        Commands::Convert {
            peak,
            burden,
            ac_volts,
        } => {
            cmd_convert(peak, burden, ac_volts);
        }
    }
}

fn cmd_run(interval: Option<u64>, burden: Option<f64>, ac_volts: Option<f64>) {
    // Load or create configuration, with CLI overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(secs) = interval {
        config.read_interval = Duration::from_secs(secs);
    }
    if burden.is_some() || ac_volts.is_some() {
        config.targets = vec![TargetConfig {
            burden: burden.unwrap_or(0.0),
            ac_volts: ac_volts.unwrap_or(120.0),
        }];
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create data directory: {e}");
    }

    // Readings go to stdout; everything human-facing goes to stderr.
    eprintln!("Watts-RMS Agent v{VERSION}");
    eprintln!("  Read interval: {}s", config.read_interval.as_secs());
    for (i, target) in config.targets.iter().enumerate() {
        eprintln!(
            "  Target {i}: burden {} ohm, {} VAC",
            target.burden, target.ac_volts
        );
    }
    eprintln!();
    eprintln!("Reading samples from stdin. Press Ctrl+C to stop.");

    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));
    let plugin = WattsRmsPlugin::from_config(&config, stats.clone());
    let dispatcher = JsonLineDispatcher::new(io::stdout());

    // Feed samples from stdin on a separate thread; the channel disconnects
    // on EOF when the reader drops its sender.
    let (sender, receiver) = feed::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        feed::read_samples(stdin.lock(), &sender);
    });

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Warning: Could not install Ctrl+C handler: {e}");
    }

    // Main loop: fold samples as they arrive, drain on the read cadence.
    let mut last_read = Instant::now();
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(sample) => {
                plugin.ingest(&sample);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                // stdin closed; emit what we have and stop.
                break;
            }
        }

        if last_read.elapsed() >= config.read_interval {
            dispatch_readings(&plugin.read(Utc::now()), &dispatcher);
            last_read = Instant::now();
        }
    }

    // Final read cycle so the last partial window is not lost.
    dispatch_readings(&plugin.read(Utc::now()), &dispatcher);

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save agent statistics: {e}");
    }

    eprintln!();
    eprintln!("{}", stats.summary());
}

fn dispatch_readings(readings: &[PowerReading], dispatcher: &impl Dispatch) {
    for reading in readings {
        if let Err(e) = dispatcher.dispatch(reading) {
            eprintln!("Warning: Failed to dispatch reading: {e}");
        }
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Watts-RMS Agent Status");
    println!("======================");
    println!();

    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        let stats = AgentStats::with_persistence(stats_path);
        let snapshot = stats.snapshot();
        println!("Cumulative Statistics:");
        println!("  Samples ingested: {}", snapshot.samples_ingested);
        println!("  Sources registered: {}", snapshot.sources_registered);
        println!("  Windows drained: {}", snapshot.windows_drained);
        println!("  Readings emitted: {}", snapshot.readings_emitted);
    } else {
        println!("No previous session data found.");
        println!("Run 'watts-rms run' to start the agent.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration file: {:?}", Config::config_path());
    println!();
    println!("  Read interval: {}s", config.read_interval.as_secs());
    println!("  Data path: {:?}", config.data_path);
    for (i, target) in config.targets.iter().enumerate() {
        println!(
            "  Target {i}: burden {} ohm, {} VAC",
            target.burden, target.ac_volts
        );
    }
}

fn cmd_convert(peak: f64, burden: f64, ac_volts: f64) {
    let watts = watts_from_peak(peak, burden, ac_volts);
    println!("peak {peak} mV, burden {burden} ohm, {ac_volts} VAC -> {watts} W");
}
