//! Configuration commands

use anyhow::Result;
use serde_json::json;
use tickrate_profiler::{Capacity, Profiler, StandardWindow};

use crate::commands::GlobalOptions;
use crate::error::CliError;
use crate::output;

/// Print the effective configuration as YAML, or with `check`, validate it
/// and print the capacity each window resolves to.
pub fn execute(options: &GlobalOptions, check: bool) -> Result<()> {
    let config = options.load_config()?;
    if !check {
        output::print_yaml(&config)?;
        return Ok(());
    }

    config.validate().map_err(CliError::from)?;
    let profiler = Profiler::new(config);
    let windows: serde_json::Map<String, serde_json::Value> = profiler
        .window_names()
        .into_iter()
        .filter_map(|name| {
            let window = profiler.window(&name)?;
            let capacity = match window.capacity() {
                Capacity::Bounded(limit) => json!(limit),
                Capacity::Unbounded => json!("unbounded"),
            };
            let is_standard = StandardWindow::from_name(&name).is_some();
            Some((
                name,
                json!({
                    "label": window.name(),
                    "short_name": window.short_name(),
                    "capacity": capacity,
                    "standard": is_standard,
                }),
            ))
        })
        .collect();

    output::print_success(&json!({
        "valid": true,
        "source": profiler.config().source,
        "windows": windows,
    }))?;
    Ok(())
}
