//! Adapters from host timing events to samples.
//!
//! Hosts either run a repeating task once per tick, which can only measure
//! the time since the previous run ([`IntervalClock`]), or emit a tick-end
//! notification carrying the work time and the time left before the next
//! tick ([`TickEndEvent`]). Both feed [`Profiler::observe`](crate::Profiler::observe).

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Which kind of timing source a host adapter should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Prefer tick-end events, fall back to interval timing.
    #[default]
    Auto,
    /// Time between successive runs of a repeating task.
    Interval,
    /// Tick-end notifications with a work/idle breakdown.
    TickEnd,
}

impl SourceKind {
    /// Resolve `Auto` against what the host offers.
    #[must_use]
    pub const fn resolve(self, tick_end_available: bool) -> Self {
        match self {
            SourceKind::Auto if tick_end_available => SourceKind::TickEnd,
            SourceKind::Auto => SourceKind::Interval,
            other => other,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Auto => write!(f, "auto"),
            SourceKind::Interval => write!(f, "interval"),
            SourceKind::TickEnd => write!(f, "tick-end"),
        }
    }
}

/// Interval timing source.
///
/// Each call to [`tick`](Self::tick) measures the time since the previous
/// call. The first call only records the timestamp and yields no sample.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    origin: Instant,
    last_timestamp_ns: Option<u64>,
    next_sequence: u64,
}

impl IntervalClock {
    /// Create a clock whose sequence numbers start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_timestamp_ns: None,
            next_sequence: 1,
        }
    }

    /// Record a tick at `now_ns` (monotonic nanoseconds).
    pub fn tick(&mut self, now_ns: u64) -> Option<Sample> {
        let last = self.last_timestamp_ns.replace(now_ns)?;
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        Some(Sample::from_interval(sequence, now_ns, last))
    }

    /// Record a tick at the current monotonic time.
    pub fn tick_now(&mut self) -> Option<Sample> {
        let now_ns = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.tick(now_ns)
    }

    /// Forget the previous timestamp, e.g. after the host paused ticking.
    /// Sequence numbers keep increasing.
    pub fn reset(&mut self) {
        self.last_timestamp_ns = None;
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A tick-end notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickEndEvent {
    /// Host tick number, used as the sample sequence.
    pub tick_number: u64,
    /// Monotonic time at the end of the tick, in nanoseconds.
    pub timestamp_ns: u64,
    /// Work time of the tick in milliseconds.
    pub duration_ms: f64,
    /// Time left before the next tick is due; negative after an overrun.
    pub time_remaining_ns: i64,
}

impl From<TickEndEvent> for Sample {
    fn from(event: TickEndEvent) -> Self {
        Sample::from_tick_end(
            event.tick_number,
            event.timestamp_ns,
            event.duration_ms,
            event.time_remaining_ns,
        )
    }
}
