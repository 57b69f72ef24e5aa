//! Prelude for tickrate-profiler.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use tickrate_profiler::prelude::*;
//!
//! let profiler = Profiler::new(ProfilerConfig::default());
//! profiler.observe(Sample::new(1, 50.0, 50.0));
//! profiler.observe(Sample::new(2, 100.0, 50.0));
//!
//! let snapshot = profiler.snapshot("shortest")?;
//! assert!(snapshot.is_valid());
//! # Ok::<(), ProfilerError>(())
//! ```

pub use crate::config::{ProfilerConfig, ProfilerConfigBuilder, StandardIntervals};
pub use crate::diagnostics::{DebugReport, RescanStats};
pub use crate::error::{ProfilerError, ProfilerResult};
pub use crate::interval::{IntervalUnit, TimeInterval, interval_to_samples, short_interval_name};
pub use crate::profiler::{CompositeReport, HISTORY_WINDOW, Measurement, Profiler, StandardWindow};
pub use crate::sample::Sample;
pub use crate::snapshot::{LengthStats, Snapshot, WindowLabel};
pub use crate::source::{IntervalClock, SourceKind, TickEndEvent};
pub use crate::window::{Capacity, Window};
