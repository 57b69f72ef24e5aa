//! Command implementations for tickctl CLI

pub mod config;
pub mod replay;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tickrate_profiler::{Profiler, ProfilerConfig, SourceKind};

use crate::error::CliError;
use crate::trace::{self, ReplaySummary, Replayer, TraceRecord};

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub source: Option<SourceKind>,
    pub debug: bool,
}

impl GlobalOptions {
    /// Effective configuration: the file if given, then flag overrides.
    pub fn load_config(&self) -> Result<ProfilerConfig> {
        let mut config = match &self.config {
            Some(path) => ProfilerConfig::from_path(path)
                .map_err(CliError::from)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ProfilerConfig::default(),
        };
        if let Some(source) = self.source {
            config.source = source;
        }
        if self.debug {
            config.debug = true;
        }
        Ok(config)
    }

    /// Build a profiler from the effective configuration. Invalid intervals
    /// fall back to defaults with a warning, as they would in a host.
    pub fn profiler(&self) -> Result<Profiler> {
        Ok(Profiler::new(self.load_config()?))
    }
}

pub fn load_records(path: &Path) -> Result<Vec<TraceRecord>> {
    trace::read_trace(path).with_context(|| format!("failed to read trace {}", path.display()))
}

/// Replay a trace file into a fresh profiler.
pub fn replay_file(options: &GlobalOptions, path: &Path) -> Result<(Profiler, ReplaySummary)> {
    let profiler = options.profiler()?;
    let records = load_records(path)?;
    let mut replayer = Replayer::new(profiler.config().source, &records);
    replayer.replay(&profiler, &records);
    Ok((profiler, replayer.summary()))
}
