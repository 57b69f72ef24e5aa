//! Human time-interval strings.
//!
//! Window capacities are configured as `"<integer> <unit>"` strings such as
//! `"5 minutes"` and converted to sample counts at the nominal rate of
//! [`SAMPLES_PER_SECOND`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ProfilerError, ProfilerResult};

/// Nominal sampling rate: one sample per tick, twenty ticks per second.
pub const SAMPLES_PER_SECOND: i64 = 20;

/// Sentinel returned by [`interval_to_samples`] for malformed input.
pub const UNPARSEABLE_INTERVAL: i32 = -1;

/// Unit of a time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

impl IntervalUnit {
    /// All units, finest first.
    pub const ALL: [IntervalUnit; 7] = [
        IntervalUnit::Nanoseconds,
        IntervalUnit::Microseconds,
        IntervalUnit::Milliseconds,
        IntervalUnit::Seconds,
        IntervalUnit::Minutes,
        IntervalUnit::Hours,
        IntervalUnit::Days,
    ];

    /// The plural lowercase name, as written in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IntervalUnit::Nanoseconds => "nanoseconds",
            IntervalUnit::Microseconds => "microseconds",
            IntervalUnit::Milliseconds => "milliseconds",
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        }
    }

    /// Look a unit up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.name().eq_ignore_ascii_case(name))
    }

    /// Convert an amount of this unit to whole seconds, truncating toward
    /// zero.
    #[must_use]
    pub const fn to_seconds(self, amount: i64) -> i64 {
        match self {
            IntervalUnit::Nanoseconds => amount / 1_000_000_000,
            IntervalUnit::Microseconds => amount / 1_000_000,
            IntervalUnit::Milliseconds => amount / 1_000,
            IntervalUnit::Seconds => amount,
            IntervalUnit::Minutes => amount.saturating_mul(60),
            IntervalUnit::Hours => amount.saturating_mul(3_600),
            IntervalUnit::Days => amount.saturating_mul(86_400),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed `"<integer> <unit>"` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    amount: u32,
    unit: IntervalUnit,
}

impl TimeInterval {
    /// Create an interval from its parts.
    #[must_use]
    pub const fn new(amount: u32, unit: IntervalUnit) -> Self {
        Self { amount, unit }
    }

    /// Parse `"<integer> <unit>"`. Tokens after the unit are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::InvalidInterval`] if the amount is not a
    /// non-negative 32-bit integer or the unit is not recognised.
    pub fn parse(interval: &str) -> ProfilerResult<Self> {
        let mut parts = interval.split_whitespace();
        let amount = parts
            .next()
            .and_then(|token| token.parse::<u32>().ok())
            .filter(|amount| i32::try_from(*amount).is_ok())
            .ok_or_else(|| ProfilerError::invalid_interval(interval))?;
        let unit = parts
            .next()
            .and_then(IntervalUnit::from_name)
            .ok_or_else(|| ProfilerError::invalid_interval(interval))?;
        Ok(Self { amount, unit })
    }

    /// The numeric part.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// The unit part.
    #[must_use]
    pub const fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// Number of samples this interval spans at [`SAMPLES_PER_SECOND`].
    #[must_use]
    pub fn sample_count(&self) -> i32 {
        duration_to_samples(i64::from(self.amount), self.unit)
    }

    /// Compact name, e.g. `5m` for five minutes.
    #[must_use]
    pub fn short_name(&self) -> String {
        short_interval_name(&self.to_string())
    }
}

impl FromStr for TimeInterval {
    type Err = ProfilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Convert an interval string to a sample count, or
/// [`UNPARSEABLE_INTERVAL`] if it cannot be parsed.
///
/// Capacity policy for the sentinel is left to the caller.
#[must_use]
pub fn interval_to_samples(interval: &str) -> i32 {
    TimeInterval::parse(interval).map_or(UNPARSEABLE_INTERVAL, |parsed| parsed.sample_count())
}

/// Convert an amount of time to a sample count, clamped to `i32::MAX`.
#[must_use]
pub fn duration_to_samples(amount: i64, unit: IntervalUnit) -> i32 {
    let samples = unit.to_seconds(amount).saturating_mul(SAMPLES_PER_SECOND);
    i32::try_from(samples).unwrap_or(if samples < 0 { i32::MIN } else { i32::MAX })
}

/// Derive a short display name from an interval string: the numeric token
/// followed by the first letter of the unit token (`"5 minutes"` → `"5m"`).
///
/// Strings without two tokens are returned unchanged.
#[must_use]
pub fn short_interval_name(interval: &str) -> String {
    let mut parts = interval.split_whitespace();
    match (parts.next(), parts.next().and_then(|unit| unit.chars().next())) {
        (Some(amount), Some(letter)) => format!("{amount}{letter}"),
        _ => interval.to_string(),
    }
}
