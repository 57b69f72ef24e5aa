//! Rolling sample windows with incrementally maintained aggregates.
//!
//! A [`Window`] keeps its samples oldest first together with the running
//! count, sum and sum of squares of their lengths, and the positions of the
//! current shortest and longest sample. Appending is O(1). When a bounded
//! window overflows, the oldest sample is evicted; only if that sample held
//! the cached minimum or maximum does the window rescan what remains.
//!
//! # Thread Safety
//!
//! All state sits behind one `RwLock` per window. The single producer takes
//! the write lock for append, eviction and rescan. Readers take the read
//! lock for their whole scan, so they never observe aggregates that disagree
//! with the samples they iterate.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::diagnostics::RescanStats;
use crate::error::ProfilerResult;
use crate::interval::TimeInterval;
use crate::sample::Sample;
use crate::snapshot::{LengthStats, Snapshot, WindowLabel};

/// Maximum number of samples a window retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    /// At most this many samples; older ones are evicted.
    Bounded(usize),
    /// Samples accumulate until the window is dropped.
    Unbounded,
}

impl Capacity {
    /// Capacity from a parsed sample count. Negative counts (including the
    /// unparseable sentinel) yield `None`.
    #[must_use]
    pub fn from_sample_count(samples: i32) -> Option<Self> {
        usize::try_from(samples).ok().map(Capacity::Bounded)
    }

    /// Capacity covering a time interval at the nominal sampling rate.
    #[must_use]
    pub fn spanning(interval: &TimeInterval) -> Self {
        Self::from_sample_count(interval.sample_count()).unwrap_or(Capacity::Unbounded)
    }

    /// The bound, or `usize::MAX` for unbounded windows.
    #[must_use]
    pub const fn limit(self) -> usize {
        match self {
            Capacity::Bounded(limit) => limit,
            Capacity::Unbounded => usize::MAX,
        }
    }

    /// Whether this is a bounded capacity.
    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self, Capacity::Bounded(_))
    }
}

#[derive(Debug)]
struct WindowState {
    capacity: Capacity,
    samples: VecDeque<Sample>,
    sum_length: f64,
    sum_squared_length: f64,
    // Insertion position of `samples[0]`; equals the number of evictions.
    front_position: u64,
    min_position: Option<u64>,
    max_position: Option<u64>,
    rescans: RescanStats,
}

impl WindowState {
    fn new(capacity: Capacity) -> Self {
        let preallocate = match capacity {
            Capacity::Bounded(limit) => limit.saturating_add(1).min(4096),
            Capacity::Unbounded => 0,
        };
        Self {
            capacity,
            samples: VecDeque::with_capacity(preallocate),
            sum_length: 0.0,
            sum_squared_length: 0.0,
            front_position: 0,
            min_position: None,
            max_position: None,
            rescans: RescanStats::default(),
        }
    }

    fn index_of(&self, position: u64) -> Option<usize> {
        position
            .checked_sub(self.front_position)
            .and_then(|offset| usize::try_from(offset).ok())
    }

    fn at_position(&self, position: Option<u64>) -> Option<&Sample> {
        position
            .and_then(|position| self.index_of(position))
            .and_then(|index| self.samples.get(index))
    }

    fn min_sample(&self) -> Option<&Sample> {
        self.at_position(self.min_position)
    }

    fn max_sample(&self) -> Option<&Sample> {
        self.at_position(self.max_position)
    }

    fn next_position(&self) -> u64 {
        self.front_position.saturating_add(self.samples.len() as u64)
    }

    fn push(&mut self, sample: Sample) {
        let position = self.next_position();
        let length = sample.length_ms();

        self.samples.push_back(sample);
        self.sum_length += length;
        self.sum_squared_length += length * length;

        // Ties move the cached extremum to the newest sample.
        if self.min_sample().is_none_or(|min| length <= min.length_ms()) {
            self.min_position = Some(position);
        }
        if self.max_sample().is_none_or(|max| length >= max.length_ms()) {
            self.max_position = Some(position);
        }

        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.samples.len() > self.capacity.limit() {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        let Some(removed) = self.samples.pop_front() else {
            return;
        };
        let position = self.front_position;
        self.front_position = self.front_position.saturating_add(1);

        if self.samples.is_empty() {
            self.reset_aggregates();
            return;
        }

        let length = removed.length_ms();
        self.sum_length -= length;
        self.sum_squared_length -= length * length;

        if self.min_position == Some(position) {
            self.rescan_min();
        }
        if self.max_position == Some(position) {
            self.rescan_max();
        }
    }

    fn rescan_min(&mut self) {
        let started = Instant::now();
        self.min_position = self.scan_extremum(|candidate, best| candidate <= best);
        self.rescans.record(started.elapsed());
        tracing::trace!(rescans = self.rescans.count, "Rescanned window minimum");
    }

    fn rescan_max(&mut self) {
        let started = Instant::now();
        self.max_position = self.scan_extremum(|candidate, best| candidate >= best);
        self.rescans.record(started.elapsed());
        tracing::trace!(rescans = self.rescans.count, "Rescanned window maximum");
    }

    fn scan_extremum(&self, replaces: impl Fn(f64, f64) -> bool) -> Option<u64> {
        let mut best: Option<(u64, f64)> = None;
        for (position, sample) in (self.front_position..).zip(self.samples.iter()) {
            let length = sample.length_ms();
            if best.is_none_or(|(_, best_length)| replaces(length, best_length)) {
                best = Some((position, length));
            }
        }
        best.map(|(position, _)| position)
    }

    fn reset_aggregates(&mut self) {
        self.sum_length = 0.0;
        self.sum_squared_length = 0.0;
        self.min_position = None;
        self.max_position = None;
    }

    fn whole_stats(&self) -> Option<LengthStats> {
        let min = self.min_sample()?.length_ms();
        let max = self.max_sample()?.length_ms();
        LengthStats::from_sums(
            self.samples.len(),
            self.sum_length,
            self.sum_squared_length,
            min,
            max,
        )
    }

    fn suffix_start(&self, suffix_len: usize) -> usize {
        self.samples.len() - suffix_len.min(self.samples.len())
    }

    fn suffix_stats(&self, suffix_len: usize) -> Option<LengthStats> {
        let start = self.suffix_start(suffix_len);
        LengthStats::scan(self.samples.range(start..))
    }
}

/// A bounded or unbounded window of recent samples.
pub struct Window {
    label: Option<WindowLabel>,
    state: RwLock<WindowState>,
}

impl Window {
    /// Create an unnamed window.
    #[must_use]
    pub fn new(capacity: Capacity) -> Self {
        Self {
            label: None,
            state: RwLock::new(WindowState::new(capacity)),
        }
    }

    /// Create an unnamed window holding at most `limit` samples.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self::new(Capacity::Bounded(limit))
    }

    /// Create an unnamed window that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(Capacity::Unbounded)
    }

    /// Create a window with display names.
    #[must_use]
    pub fn labelled(label: WindowLabel, capacity: Capacity) -> Self {
        Self {
            label: Some(label),
            state: RwLock::new(WindowState::new(capacity)),
        }
    }

    /// Create a window spanning a human time interval such as `"5 minutes"`.
    ///
    /// The interval string becomes the window's name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProfilerError::InvalidInterval`] if the interval
    /// cannot be parsed; choosing a fallback capacity is up to the caller.
    pub fn from_interval(interval: &str) -> ProfilerResult<Self> {
        let parsed = TimeInterval::parse(interval)?;
        Ok(Self::labelled(
            WindowLabel::new(interval),
            Capacity::spanning(&parsed),
        ))
    }

    /// Create a window spanning an already parsed interval.
    #[must_use]
    pub fn spanning(interval: TimeInterval) -> Self {
        Self::labelled(
            WindowLabel::new(interval.to_string()),
            Capacity::spanning(&interval),
        )
    }

    /// Record a new sample, evicting the oldest one if the window is full.
    ///
    /// Amortized O(1): only evicting the sample that holds the cached
    /// minimum or maximum triggers a linear rescan.
    pub fn add_sample(&self, sample: Sample) {
        self.state.write().push(sample);
    }

    /// Copies of the most recent `min(count, len)` samples, oldest first.
    #[must_use]
    pub fn last_samples(&self, count: usize) -> Vec<Sample> {
        let state = self.state.read();
        let start = state.suffix_start(count);
        state.samples.range(start..).copied().collect()
    }

    /// Copies of every held sample, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.state.read().samples.iter().copied().collect()
    }

    /// Build a snapshot over the most recent `suffix_len` samples.
    ///
    /// `suffix_len` is clamped to the number of held samples. The whole
    /// window is served from the running aggregates in O(1); a shorter
    /// suffix is scanned in O(`suffix_len`). Fewer than two samples yield
    /// an invalid snapshot.
    #[must_use]
    pub fn build_snapshot(&self, suffix_len: usize) -> Snapshot {
        let state = self.state.read();
        let count = state.samples.len();
        let suffix_len = suffix_len.min(count);
        if suffix_len < 2 {
            return Snapshot::invalid(self.label.as_ref());
        }

        let stats = if suffix_len == count {
            state.whole_stats()
        } else {
            state.suffix_stats(suffix_len)
        };
        let first = state.samples.get(count - suffix_len);
        let last = state.samples.back();

        match (stats, first, last) {
            (Some(stats), Some(first), Some(last)) => {
                Snapshot::build(self.label.as_ref(), first, last, stats, state.rescans)
            }
            _ => Snapshot::invalid(self.label.as_ref()),
        }
    }

    /// Snapshot of the whole window.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.build_snapshot(usize::MAX)
    }

    /// Number of held samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().samples.len()
    }

    /// Whether the window holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().samples.is_empty()
    }

    /// Current capacity.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.state.read().capacity
    }

    /// Change the capacity. Shrinking below the current length evicts the
    /// oldest samples immediately.
    pub fn set_capacity(&self, capacity: Capacity) {
        let mut state = self.state.write();
        state.capacity = capacity;
        state.enforce_capacity();
    }

    /// Drop every sample. Rescan counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let next = state.next_position();
        state.samples.clear();
        state.front_position = next;
        state.reset_aggregates();
    }

    /// Display names, if the window has them.
    #[must_use]
    pub fn label(&self) -> Option<&WindowLabel> {
        self.label.as_ref()
    }

    /// Full display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.label.as_ref().map(|label| label.name.as_str())
    }

    /// Compact display name, if any.
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.label.as_ref().map(|label| label.short_name.as_str())
    }

    /// Shortest held length.
    #[must_use]
    pub fn min_length_ms(&self) -> Option<f64> {
        self.state.read().min_sample().map(Sample::length_ms)
    }

    /// Longest held length.
    #[must_use]
    pub fn max_length_ms(&self) -> Option<f64> {
        self.state.read().max_sample().map(Sample::length_ms)
    }

    /// The sample holding the cached minimum.
    #[must_use]
    pub fn min_sample(&self) -> Option<Sample> {
        self.state.read().min_sample().copied()
    }

    /// The sample holding the cached maximum.
    #[must_use]
    pub fn max_sample(&self) -> Option<Sample> {
        self.state.read().max_sample().copied()
    }

    /// Mean held length.
    #[must_use]
    pub fn average_length_ms(&self) -> Option<f64> {
        self.state.read().whole_stats().map(|stats| stats.avg_ms)
    }

    /// Population standard deviation of held lengths.
    #[must_use]
    pub fn stddev_length_ms(&self) -> Option<f64> {
        self.state.read().whole_stats().map(|stats| stats.stddev_ms)
    }

    /// Running sum of held lengths.
    #[must_use]
    pub fn sum_length_ms(&self) -> f64 {
        self.state.read().sum_length
    }

    /// Running sum of squared held lengths.
    #[must_use]
    pub fn sum_squared_length_ms(&self) -> f64 {
        self.state.read().sum_squared_length
    }

    /// The most recent sample.
    #[must_use]
    pub fn last_sample(&self) -> Option<Sample> {
        self.state.read().samples.back().copied()
    }

    /// The sample at `index`, counting from the oldest.
    #[must_use]
    pub fn sample_at(&self, index: usize) -> Option<Sample> {
        self.state.read().samples.get(index).copied()
    }

    /// The sample `offset` places before the newest one (`0` is the newest).
    #[must_use]
    pub fn sample_from_end(&self, offset: usize) -> Option<Sample> {
        let state = self.state.read();
        let index = state.samples.len().checked_sub(offset)?.checked_sub(1)?;
        state.samples.get(index).copied()
    }

    /// The sample numbered `sequence`, located by its offset from the newest
    /// sample. Sequence numbers are assumed to be consecutive; a gap or an
    /// aged-out sequence yields `None`.
    #[must_use]
    pub fn sample_by_sequence(&self, sequence: u64) -> Option<Sample> {
        let state = self.state.read();
        let newest = state.samples.back()?;
        let offset = usize::try_from(newest.sequence().checked_sub(sequence)?).ok()?;
        let index = state.samples.len().checked_sub(offset)?.checked_sub(1)?;
        state
            .samples
            .get(index)
            .copied()
            .filter(|sample| sample.sequence() == sequence)
    }

    /// Extremum rescan counters.
    #[must_use]
    pub fn rescan_stats(&self) -> RescanStats {
        self.state.read().rescans
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Window")
            .field("name", &self.name())
            .field("capacity", &state.capacity)
            .field("len", &state.samples.len())
            .field("rescans", &state.rescans.count)
            .finish()
    }
}
