//! Report commands

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tickrate_profiler::{TimeInterval, short_interval_name};

use crate::commands::{GlobalOptions, replay_file};
use crate::error::CliError;
use crate::output;

/// Replay a trace and print the composite report of the standard windows.
///
/// Fails with [`CliError::InsufficientData`] until every standard window
/// holds at least two samples.
pub fn execute(options: &GlobalOptions, trace: &Path) -> Result<()> {
    let (profiler, summary) = replay_file(options, trace)?;
    let report = profiler.composite_report().map_err(CliError::from)?;

    output::print_success(&json!({
        "replay": summary,
        "rates": report.rates(),
        "report": report,
    }))?;
    Ok(())
}

/// Replay a trace and print the debug view of the longest window.
pub fn execute_debug(options: &GlobalOptions, trace: &Path) -> Result<()> {
    let (profiler, summary) = replay_file(options, trace)?;
    let Some(report) = profiler.debug_report() else {
        return Err(CliError::InsufficientData(
            "the longest window holds fewer than 2 samples".to_string(),
        )
        .into());
    };
    profiler.log_debug_report();

    output::print_success(&json!({
        "replay": summary,
        "debug": report,
    }))?;
    Ok(())
}

/// Print the sample count and short name of an interval string.
pub fn execute_interval(interval: &str) -> Result<()> {
    let parsed = TimeInterval::parse(interval).map_err(CliError::from)?;

    output::print_success(&json!({
        "interval": interval,
        "normalized": parsed.to_string(),
        "samples": parsed.sample_count(),
        "short_name": short_interval_name(interval),
    }))?;
    Ok(())
}
