//! Point-in-time reports built from a window.
//!
//! A [`Snapshot`] is a value: it is computed once from a window's state and
//! never changes afterwards. Callers must check [`Snapshot::is_valid`]
//! before reading the rate or any statistic.

use serde::Serialize;

use crate::diagnostics::RescanStats;
use crate::interval::short_interval_name;
use crate::sample::Sample;

/// Display names attached to a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowLabel {
    /// Full name, e.g. `5 minutes`.
    pub name: String,
    /// Compact name, e.g. `5m`.
    pub short_name: String,
}

impl WindowLabel {
    /// Label with the short name derived from the full name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let short_name = short_interval_name(&name);
        Self { name, short_name }
    }

    /// Label with an explicit short name.
    #[must_use]
    pub fn with_short_name(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
        }
    }
}

/// Length statistics over a run of samples, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthStats {
    /// Number of samples.
    pub count: usize,
    /// Shortest length.
    pub min_ms: f64,
    /// Mean length.
    pub avg_ms: f64,
    /// Longest length.
    pub max_ms: f64,
    /// Population standard deviation.
    pub stddev_ms: f64,
}

impl LengthStats {
    /// Statistics from running sums and known extremes.
    ///
    /// Returns `None` for an empty run.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "sample counts stay far below 2^52")]
    pub fn from_sums(
        count: usize,
        sum_ms: f64,
        sum_squared_ms: f64,
        min_ms: f64,
        max_ms: f64,
    ) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let n = count as f64;
        let avg_ms = sum_ms / n;
        let variance = sum_squared_ms / n - avg_ms * avg_ms;
        // rounding can push the variance of near-identical samples below zero
        let stddev_ms = if variance > 0.0 { variance.sqrt() } else { 0.0 };
        Some(Self {
            count,
            min_ms,
            avg_ms,
            max_ms,
            stddev_ms,
        })
    }

    /// Statistics from a single scan over the samples.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn scan<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut sum_squared = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for sample in samples {
            let length = sample.length_ms();
            count = count.saturating_add(1);
            sum += length;
            sum_squared += length * length;
            min = min.min(length);
            max = max.max(length);
        }
        Self::from_sums(count, sum, sum_squared, min, max)
    }
}

/// Rate and length report over a window or a suffix of it.
///
/// When `is_valid` is false, fewer than two samples were available: no
/// interval exists, so no rate is defined and every numeric field is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Display name.
    pub name: String,
    /// Compact display name.
    pub short_name: String,
    /// Whether at least two samples were available.
    pub is_valid: bool,
    /// Samples covered.
    pub sample_count: usize,
    /// Gaps between covered samples (`sample_count - 1`).
    pub interval_count: usize,
    /// Timestamp of the first covered sample.
    pub start_time_ms: f64,
    /// Timestamp of the last covered sample.
    pub end_time_ms: f64,
    /// `end_time_ms - start_time_ms`.
    pub elapsed_ms: f64,
    /// Elapsed time in seconds.
    pub elapsed_seconds: f64,
    /// Length of the most recent covered sample.
    pub current_length_ms: f64,
    /// Shortest covered length.
    pub min_length_ms: f64,
    /// Mean covered length.
    pub avg_length_ms: f64,
    /// Longest covered length.
    pub max_length_ms: f64,
    /// Population standard deviation of covered lengths.
    pub stddev_length_ms: f64,
    /// Intervals per second (`interval_count / elapsed_seconds`).
    pub rate: f64,
    /// Extremum rescans the source window has performed.
    pub rescan_count: u64,
    /// Average rescan cost in milliseconds.
    pub rescan_average_ms: f64,
}

impl Snapshot {
    /// A snapshot for a span with fewer than two samples.
    #[must_use]
    pub fn invalid(label: Option<&WindowLabel>) -> Self {
        let (name, short_name) = label
            .map(|label| (label.name.clone(), label.short_name.clone()))
            .unwrap_or_default();
        Self {
            name,
            short_name,
            is_valid: false,
            sample_count: 0,
            interval_count: 0,
            start_time_ms: 0.0,
            end_time_ms: 0.0,
            elapsed_ms: 0.0,
            elapsed_seconds: 0.0,
            current_length_ms: 0.0,
            min_length_ms: 0.0,
            avg_length_ms: 0.0,
            max_length_ms: 0.0,
            stddev_length_ms: 0.0,
            rate: 0.0,
            rescan_count: 0,
            rescan_average_ms: 0.0,
        }
    }

    /// Build a snapshot from the first and last covered samples and the
    /// statistics over the covered span.
    ///
    /// Unnamed windows are labelled by their elapsed time, e.g.
    /// `12.34 seconds`. Spans of fewer than two samples yield an invalid
    /// snapshot.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "sample counts stay far below 2^52")]
    pub fn build(
        label: Option<&WindowLabel>,
        first: &Sample,
        last: &Sample,
        stats: LengthStats,
        rescans: RescanStats,
    ) -> Self {
        if stats.count < 2 {
            return Self::invalid(label);
        }
        let interval_count = stats.count - 1;
        let start_time_ms = first.timestamp_ms();
        let end_time_ms = last.timestamp_ms();
        let elapsed_ms = end_time_ms - start_time_ms;
        let elapsed_seconds = elapsed_ms / 1e3;
        let rate = if elapsed_seconds > 0.0 {
            interval_count as f64 / elapsed_seconds
        } else {
            0.0
        };
        let label = label
            .cloned()
            .unwrap_or_else(|| WindowLabel::new(format!("{elapsed_seconds:.2} seconds")));

        Self {
            name: label.name,
            short_name: label.short_name,
            is_valid: true,
            sample_count: stats.count,
            interval_count,
            start_time_ms,
            end_time_ms,
            elapsed_ms,
            elapsed_seconds,
            current_length_ms: last.length_ms(),
            min_length_ms: stats.min_ms,
            avg_length_ms: stats.avg_ms,
            max_length_ms: stats.max_ms,
            stddev_length_ms: stats.stddev_ms,
            rate,
            rescan_count: rescans.count,
            rescan_average_ms: rescans.average_ms(),
        }
    }

    /// Replace the display names.
    #[must_use]
    pub fn with_label(mut self, label: WindowLabel) -> Self {
        self.name = label.name;
        self.short_name = label.short_name;
        self
    }

    /// Whether at least two samples were available.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The rate, or `None` for an invalid snapshot.
    #[must_use]
    pub fn valid_rate(&self) -> Option<f64> {
        self.is_valid.then_some(self.rate)
    }
}
