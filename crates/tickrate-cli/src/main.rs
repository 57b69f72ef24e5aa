//! tickctl - Tick-rate profiler CLI
//!
//! Replays recorded tick traces through the profiling engine and prints
//! window snapshots and reports as JSON.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;
mod trace;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tickrate_profiler::SourceKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::GlobalOptions;

#[derive(Parser)]
#[command(name = "tickctl")]
#[command(about = "Tick-rate profiler CLI - Replay tick traces and report server tick rates")]
#[command(version)]
#[command(long_about = "
tickctl feeds a recorded tick trace (JSON Lines) through the tick-rate
profiler and prints snapshots of its rolling windows. Each trace line is a
tick-end event, a bare tick timestamp, or a ready-made sample.

Results are printed as JSON. Use --json to get errors as JSON as well.
")]
struct Cli {
    /// Print errors as JSON on stdout
    #[arg(long, global = true, help = "Output errors in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Profiler configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Timing source to replay: auto, interval or tick-end
    #[arg(long, global = true, value_parser = parse_source)]
    source: Option<SourceKind>,

    /// Log a debug report every `debug_interval_samples` samples
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trace and print window snapshots
    Replay {
        /// Trace file (JSON Lines)
        trace: PathBuf,
        /// Only report these windows
        #[arg(short, long = "window")]
        windows: Vec<String>,
    },

    /// Replay a trace and print the composite report of the standard windows
    Report {
        /// Trace file (JSON Lines)
        trace: PathBuf,
    },

    /// Replay a trace and report the last N ticks
    Ticks {
        /// Trace file (JSON Lines)
        trace: PathBuf,
        /// Number of ticks to cover
        #[arg(short, long, default_value_t = 20)]
        count: usize,
        /// Include the per-tick samples
        #[arg(long)]
        samples: bool,
    },

    /// Replay a trace with an ad-hoc measurement window
    Measure {
        /// Trace file (JSON Lines)
        trace: PathBuf,
        /// Measurement window name
        #[arg(long, default_value = "measurement")]
        name: String,
        /// First sample sequence number to measure
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Last sample sequence number to measure
        #[arg(long)]
        end: Option<u64>,
    },

    /// Replay a trace and print the debug view of the longest window
    Debug {
        /// Trace file (JSON Lines)
        trace: PathBuf,
    },

    /// Convert an interval such as "5 minutes" to a sample count
    Interval {
        /// Interval string
        interval: String,
    },

    /// Show or check the effective configuration
    Config {
        /// Validate and list the resolved windows
        #[arg(long)]
        check: bool,
    },
}

fn parse_source(value: &str) -> Result<SourceKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Ok(SourceKind::Auto),
        "interval" => Ok(SourceKind::Interval),
        "tick-end" | "tickend" | "tick_end" => Ok(SourceKind::TickEnd),
        other => Err(format!(
            "unknown source '{other}', expected auto, interval or tick-end"
        )),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tickctl={log_level},tickrate_profiler={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(output::exit_code(&e))
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let options = GlobalOptions {
        config: cli.config.clone(),
        source: cli.source,
        debug: cli.debug,
    };

    match &cli.command {
        Commands::Replay { trace, windows } => commands::replay::execute(&options, trace, windows),
        Commands::Report { trace } => commands::report::execute(&options, trace),
        Commands::Ticks {
            trace,
            count,
            samples,
        } => commands::replay::execute_ticks(&options, trace, *count, *samples),
        Commands::Measure {
            trace,
            name,
            start,
            end,
        } => commands::replay::execute_measure(&options, trace, name, *start, *end),
        Commands::Debug { trace } => commands::report::execute_debug(&options, trace),
        Commands::Interval { interval } => commands::report::execute_interval(interval),
        Commands::Config { check } => commands::config::execute(&options, *check),
    }
}
