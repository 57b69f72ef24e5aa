//! Timing samples.
//!
//! A [`Sample`] records one tick. Timing sources come in two shapes: some
//! can only report the time since the previous tick, others report the work
//! time and the idle time separately. Both normalise to
//! [`Sample::length_ms`], which is what every statistic is computed over.

use serde::{Deserialize, Serialize};

const NANOS_PER_MILLI: f64 = 1e6;

/// One immutable timing measurement.
///
/// Decoding goes through the same normalisation as the constructors: a
/// recorded work/idle breakdown determines the length, and negative
/// durations are stored as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SampleRecord")]
pub struct Sample {
    sequence: u64,
    timestamp_ms: f64,
    active_ms: f64,
    idle_ms: f64,
    length_ms: f64,
}

/// Wire form of a [`Sample`] before normalisation.
#[derive(Deserialize)]
struct SampleRecord {
    sequence: u64,
    timestamp_ms: f64,
    #[serde(default)]
    active_ms: f64,
    #[serde(default)]
    idle_ms: f64,
    length_ms: f64,
}

impl From<SampleRecord> for Sample {
    fn from(record: SampleRecord) -> Self {
        let active_ms = non_negative(record.active_ms);
        let idle_ms = non_negative(record.idle_ms);
        let length_ms = if active_ms > 0.0 || idle_ms > 0.0 {
            active_ms + idle_ms
        } else {
            non_negative(record.length_ms)
        };
        Self {
            sequence: record.sequence,
            timestamp_ms: record.timestamp_ms,
            active_ms,
            idle_ms,
            length_ms,
        }
    }
}

impl Sample {
    /// Create a sample with a known length and no work/idle breakdown.
    ///
    /// Negative or NaN lengths are stored as zero.
    #[must_use]
    pub fn new(sequence: u64, timestamp_ms: f64, length_ms: f64) -> Self {
        Self {
            sequence,
            timestamp_ms,
            active_ms: 0.0,
            idle_ms: 0.0,
            length_ms: non_negative(length_ms),
        }
    }

    /// Create a sample from the time elapsed since the previous event.
    ///
    /// Timestamps are monotonic nanoseconds. A previous timestamp later than
    /// the current one yields a zero-length sample.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "nanosecond timestamps fit comfortably in f64 milliseconds"
    )]
    pub fn from_interval(sequence: u64, timestamp_ns: u64, last_timestamp_ns: u64) -> Self {
        let elapsed_ns = timestamp_ns.saturating_sub(last_timestamp_ns);
        Self {
            sequence,
            timestamp_ms: timestamp_ns as f64 / NANOS_PER_MILLI,
            active_ms: 0.0,
            idle_ms: 0.0,
            length_ms: elapsed_ns as f64 / NANOS_PER_MILLI,
        }
    }

    /// Create a sample from a tick-end notification.
    ///
    /// `idle_remaining_ns` is the time left before the next tick is due. A
    /// negative value means the tick overran its budget, so there is no idle
    /// time and the length is the active time alone.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "nanosecond timestamps fit comfortably in f64 milliseconds"
    )]
    pub fn from_tick_end(
        sequence: u64,
        timestamp_ns: u64,
        active_ms: f64,
        idle_remaining_ns: i64,
    ) -> Self {
        let active_ms = non_negative(active_ms);
        let idle_ms = if idle_remaining_ns < 0 {
            0.0
        } else {
            idle_remaining_ns as f64 / NANOS_PER_MILLI
        };
        Self {
            sequence,
            timestamp_ms: timestamp_ns as f64 / NANOS_PER_MILLI,
            active_ms,
            idle_ms,
            length_ms: active_ms + idle_ms,
        }
    }

    /// Sequence number, unique and increasing per timing source.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Time at which the sample was recorded, in milliseconds.
    #[must_use]
    pub const fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Time spent working on the tick, or `0.0` when the source cannot tell.
    #[must_use]
    pub const fn active_ms(&self) -> f64 {
        self.active_ms
    }

    /// Time the tick slept before the next one, or `0.0` when unknown.
    #[must_use]
    pub const fn idle_ms(&self) -> f64 {
        self.idle_ms
    }

    /// Full tick length: active plus idle when both are known, otherwise
    /// whichever single value the source provided.
    #[must_use]
    pub const fn length_ms(&self) -> f64 {
        self.length_ms
    }

    /// Busy time of the tick, falling back to the length when the source
    /// does not separate work from idle.
    #[must_use]
    pub fn work_ms(&self) -> f64 {
        if self.active_ms > 0.0 {
            self.active_ms
        } else {
            self.length_ms
        }
    }

    /// Whether the source reported a work/idle breakdown.
    #[must_use]
    pub fn has_breakdown(&self) -> bool {
        self.active_ms > 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    // f64::max returns the non-NaN operand
    value.max(0.0)
}
