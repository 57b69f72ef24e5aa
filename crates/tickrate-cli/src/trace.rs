//! Recorded tick traces.
//!
//! A trace is JSON Lines, one record per line. Three record shapes are
//! accepted:
//!
//! ```text
//! {"tick_number": 7, "timestamp_ns": 350000000, "duration_ms": 12.5, "time_remaining_ns": 37500000}
//! {"timestamp_ns": 350000000}
//! {"sequence": 7, "timestamp_ms": 350.0, "length_ms": 50.0}
//! ```
//!
//! Tick-end records and bare timestamps are the two host timing sources; the
//! configured [`SourceKind`] decides which of them is replayed. Sample records
//! are always replayed. Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tickrate_profiler::{IntervalClock, Profiler, Sample, SourceKind, TickEndEvent};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TraceRecord {
    TickEnd(TickEndEvent),
    Interval { timestamp_ns: u64 },
    Sample(Sample),
}

impl TraceRecord {
    /// The timing source that produced the record, if any.
    fn source(&self) -> Option<SourceKind> {
        match self {
            TraceRecord::TickEnd(_) => Some(SourceKind::TickEnd),
            TraceRecord::Interval { .. } => Some(SourceKind::Interval),
            TraceRecord::Sample(_) => None,
        }
    }
}

pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>, CliError> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file))
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceRecord>, CliError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|err| CliError::InvalidTrace {
            line: index + 1,
            reason: err.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Counters describing one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub source: SourceKind,
    pub records: usize,
    pub observed: u64,
    pub skipped: u64,
}

/// Turns trace records into samples for one resolved timing source.
#[derive(Debug)]
pub struct Replayer {
    source: SourceKind,
    clock: IntervalClock,
    records: usize,
    observed: u64,
    skipped: u64,
}

impl Replayer {
    /// Resolve `requested` against the records: `auto` prefers tick-end
    /// events when the trace contains any.
    pub fn new(requested: SourceKind, records: &[TraceRecord]) -> Self {
        let tick_end_available = records
            .iter()
            .any(|record| matches!(record, TraceRecord::TickEnd(_)));
        let source = requested.resolve(tick_end_available);
        tracing::info!(%requested, %source, records = records.len(), "Replaying trace");
        Self {
            source,
            clock: IntervalClock::new(),
            records: records.len(),
            observed: 0,
            skipped: 0,
        }
    }

    /// The sample for one record, or `None` if it belongs to the other
    /// timing source or only primes the interval clock.
    pub fn sample_for(&mut self, record: &TraceRecord) -> Option<Sample> {
        if record.source().is_some_and(|source| source != self.source) {
            self.skipped += 1;
            return None;
        }
        let sample = match *record {
            TraceRecord::TickEnd(event) => Some(Sample::from(event)),
            TraceRecord::Interval { timestamp_ns } => self.clock.tick(timestamp_ns),
            TraceRecord::Sample(sample) => Some(sample),
        };
        if sample.is_some() {
            self.observed += 1;
        }
        sample
    }

    /// Feed every record into the profiler.
    pub fn replay(&mut self, profiler: &Profiler, records: &[TraceRecord]) {
        for record in records {
            if let Some(sample) = self.sample_for(record) {
                profiler.observe(sample);
            }
        }
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            source: self.source,
            records: self.records,
            observed: self.observed,
            skipped: self.skipped,
        }
    }
}
