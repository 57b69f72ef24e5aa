//! Trace replay commands

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::commands::{GlobalOptions, load_records, replay_file};
use crate::error::CliError;
use crate::output;
use crate::trace::Replayer;

/// Replay a trace and print snapshots of the requested windows, or of every
/// registered window when none are named.
pub fn execute(options: &GlobalOptions, trace: &Path, windows: &[String]) -> Result<()> {
    let (profiler, summary) = replay_file(options, trace)?;

    let names = if windows.is_empty() {
        profiler.window_names()
    } else {
        windows.to_vec()
    };
    let mut snapshots = serde_json::Map::new();
    for name in names {
        let snapshot = profiler.snapshot(&name).map_err(CliError::from)?;
        snapshots.insert(name, serde_json::to_value(snapshot)?);
    }

    output::print_success(&json!({
        "replay": summary,
        "snapshots": snapshots,
    }))?;
    Ok(())
}

/// Replay a trace and print the snapshot over the last `count` ticks,
/// optionally with the per-tick listing.
pub fn execute_ticks(
    options: &GlobalOptions,
    trace: &Path,
    count: usize,
    samples: bool,
) -> Result<()> {
    let (profiler, summary) = replay_file(options, trace)?;
    let snapshot = profiler.snapshot_suffix(count).map_err(CliError::from)?;

    let mut body = json!({
        "replay": summary,
        "snapshot": snapshot,
    });
    if samples {
        body["samples"] = serde_json::to_value(profiler.last_samples(count))?;
    }
    output::print_success(&body)?;
    Ok(())
}

/// Replay a trace with an ad-hoc measurement window open between two
/// sample sequence numbers (inclusive).
pub fn execute_measure(
    options: &GlobalOptions,
    trace: &Path,
    name: &str,
    start: u64,
    end: Option<u64>,
) -> Result<()> {
    if let Some(end) = end.filter(|end| *end < start) {
        return Err(CliError::InvalidConfiguration(format!(
            "measurement end {end} is before start {start}"
        ))
        .into());
    }

    let profiler = options.profiler()?;
    let records = load_records(trace)?;
    let mut replayer = Replayer::new(profiler.config().source, &records);

    let mut measurement = None;
    let mut finished = None;
    for record in &records {
        let Some(sample) = replayer.sample_for(record) else {
            continue;
        };
        let sequence = sample.sequence();
        if measurement.is_none() && finished.is_none() && sequence >= start {
            tracing::info!(window = %name, sequence, "Measurement started");
            measurement = Some(profiler.begin_measurement(name));
        }
        profiler.observe(sample);
        if end.is_some_and(|end| sequence >= end) {
            if let Some(active) = measurement.take() {
                tracing::info!(window = %name, sequence, "Measurement finished");
                finished = Some(active.finish());
            }
        }
    }
    let snapshot = match (finished, measurement) {
        (Some(snapshot), _) => snapshot,
        (None, Some(active)) => active.finish(),
        (None, None) => {
            return Err(CliError::InsufficientData(format!(
                "no sample at or after sequence {start}"
            ))
            .into());
        }
    };

    output::print_success(&json!({
        "replay": replayer.summary(),
        "measurement": name,
        "snapshot": snapshot,
    }))?;
    Ok(())
}
