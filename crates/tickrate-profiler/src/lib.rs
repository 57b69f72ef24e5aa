//! # tickrate-profiler
//!
//! Rolling-window tick-rate profiling for fixed-rate simulation loops.
//!
//! A host pushes one [`Sample`] per tick into a [`Profiler`], which fans it
//! out to a set of named [`Window`]s. Each window keeps running sums and the
//! positions of its shortest and longest sample, so appending is amortized
//! O(1) and a whole-window [`Snapshot`] is O(1). Snapshots report the tick
//! rate together with min, mean, max and standard deviation of tick length.
//!
//! ## Architecture
//!
//! - [`sample`] - One timing event
//! - [`window`] - Bounded or unbounded sample windows with running aggregates
//! - [`snapshot`] - Immutable rate and length reports
//! - [`profiler`] - Window registry, fan-out and query entry points
//! - [`interval`] - `"<integer> <unit>"` interval parsing
//! - [`config`] - YAML configuration
//! - [`source`] - Adapters from host timing events to samples
//! - [`diagnostics`] - Rescan counters and the debug report
//! - [`error`] - Profiler error types
//!
//! ## Windows
//!
//! A default profiler registers five standard windows spanning 5 seconds,
//! 1 minute, 5 minutes, 15 minutes and 1 hour at the nominal 20 ticks per
//! second, plus a `ticks` window holding the last 1200 samples. Ad-hoc
//! windows can be added at runtime with [`Profiler::register_window`] or
//! [`Profiler::begin_measurement`].
//!
//! ## Example
//!
//! ```rust
//! use tickrate_profiler::prelude::*;
//!
//! let profiler = Profiler::default();
//! let mut clock = IntervalClock::new();
//!
//! for tick in 0..=40u64 {
//!     if let Some(sample) = clock.tick(tick * 50_000_000) {
//!         profiler.observe(sample);
//!     }
//! }
//!
//! let report = profiler.composite_report()?;
//! for snapshot in &report.snapshots {
//!     assert!((snapshot.rate - 20.0).abs() < 1e-9);
//! }
//!
//! let last_second = profiler.snapshot_suffix(20)?;
//! assert_eq!(last_second.name, "20 ticks");
//! # Ok::<(), ProfilerError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod interval;
pub mod profiler;
pub mod sample;
pub mod snapshot;
pub mod source;
pub mod window;

pub mod prelude;

pub use config::{ProfilerConfig, ProfilerConfigBuilder, StandardIntervals};
pub use diagnostics::{DebugReport, RescanStats};
pub use error::{ProfilerError, ProfilerResult};
pub use interval::{
    IntervalUnit, SAMPLES_PER_SECOND, TimeInterval, UNPARSEABLE_INTERVAL, interval_to_samples,
    short_interval_name,
};
pub use profiler::{CompositeReport, HISTORY_WINDOW, Measurement, Profiler, StandardWindow};
pub use sample::Sample;
pub use snapshot::{LengthStats, Snapshot, WindowLabel};
pub use source::{IntervalClock, SourceKind, TickEndEvent};
pub use window::{Capacity, Window};
