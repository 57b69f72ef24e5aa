//! Diagnostic counters and the periodic debug report.

use std::time::Duration;

use serde::Serialize;

use crate::sample::Sample;
use crate::snapshot::Snapshot;

/// Counters describing extremum rescans in a window.
///
/// A rescan happens when the sample holding the cached minimum or maximum
/// ages out and the window must search for a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RescanStats {
    /// Number of rescans performed.
    pub count: u64,
    /// Total time spent rescanning, in milliseconds.
    pub total_ms: f64,
}

impl RescanStats {
    /// Record one rescan.
    pub fn record(&mut self, elapsed: Duration) {
        self.count = self.count.saturating_add(1);
        self.total_ms += elapsed.as_secs_f64() * 1e3;
    }

    /// Average rescan time in milliseconds, or `0.0` if none happened.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "rescan counts stay far below 2^52")]
    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

/// Number of most recent tick lengths carried in a [`DebugReport`].
pub const DEBUG_RECENT_SAMPLES: usize = 5;

/// Periodic debug view of the longest window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugReport {
    /// Whole-window snapshot of the longest window.
    pub snapshot: Snapshot,
    /// Lengths of the most recent samples, newest first.
    pub recent_lengths_ms: Vec<f64>,
}

impl DebugReport {
    /// Build a report from a snapshot and the window's tail, oldest first.
    #[must_use]
    pub fn new(snapshot: Snapshot, tail: &[Sample]) -> Self {
        let recent_lengths_ms = tail
            .iter()
            .rev()
            .take(DEBUG_RECENT_SAMPLES)
            .map(Sample::length_ms)
            .collect();
        Self {
            snapshot,
            recent_lengths_ms,
        }
    }

    /// Emit the report through `tracing` at debug level.
    pub fn log(&self, source: &str) {
        let s = &self.snapshot;
        tracing::debug!(
            source = %source,
            elapsed_seconds = s.elapsed_seconds,
            samples = s.sample_count,
            recent_ms = ?self.recent_lengths_ms,
            rate = s.rate,
            current_ms = s.current_length_ms,
            min_ms = s.min_length_ms,
            avg_ms = s.avg_length_ms,
            max_ms = s.max_length_ms,
            stddev_ms = s.stddev_length_ms,
            rescans = s.rescan_count,
            rescan_avg_ms = s.rescan_average_ms,
            "Tick profiler debug report"
        );
    }
}
