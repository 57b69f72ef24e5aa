//! The profiler: a named registry of windows fed by one sample stream.
//!
//! Five standard windows of increasing span are registered at construction
//! together with a per-tick history window. Callers may register further
//! ad-hoc windows at runtime, usually through a [`Measurement`] guard that
//! removes the window again when the measurement ends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::ProfilerConfig;
use crate::diagnostics::{DEBUG_RECENT_SAMPLES, DebugReport};
use crate::error::{ProfilerError, ProfilerResult};
use crate::interval::{IntervalUnit, TimeInterval};
use crate::sample::Sample;
use crate::snapshot::{Snapshot, WindowLabel};
use crate::window::{Capacity, Window};

/// Name of the per-tick history window.
pub const HISTORY_WINDOW: &str = "ticks";

/// The standard windows, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardWindow {
    /// Finest window.
    Shortest,
    /// Second window.
    Short,
    /// Middle window.
    Normal,
    /// Fourth window.
    Long,
    /// Coarsest window.
    Longest,
}

impl StandardWindow {
    /// All standard windows, finest first.
    pub const ALL: [StandardWindow; 5] = [
        StandardWindow::Shortest,
        StandardWindow::Short,
        StandardWindow::Normal,
        StandardWindow::Long,
        StandardWindow::Longest,
    ];

    /// Registry name of the window.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StandardWindow::Shortest => "shortest",
            StandardWindow::Short => "short",
            StandardWindow::Normal => "normal",
            StandardWindow::Long => "long",
            StandardWindow::Longest => "longest",
        }
    }

    /// Look a standard window up by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|window| window.name() == name)
    }

    /// Interval used when none is configured or the configured one is
    /// invalid.
    #[must_use]
    pub const fn default_interval(self) -> TimeInterval {
        match self {
            StandardWindow::Shortest => TimeInterval::new(5, IntervalUnit::Seconds),
            StandardWindow::Short => TimeInterval::new(1, IntervalUnit::Minutes),
            StandardWindow::Normal => TimeInterval::new(5, IntervalUnit::Minutes),
            StandardWindow::Long => TimeInterval::new(15, IntervalUnit::Minutes),
            StandardWindow::Longest => TimeInterval::new(1, IntervalUnit::Hours),
        }
    }
}

impl fmt::Display for StandardWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshots of all five standard windows, finest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeReport {
    /// One valid snapshot per standard window.
    pub snapshots: Vec<Snapshot>,
}

impl CompositeReport {
    /// The snapshot of one standard window.
    #[must_use]
    pub fn get(&self, window: StandardWindow) -> Option<&Snapshot> {
        let index = StandardWindow::ALL
            .iter()
            .position(|candidate| *candidate == window)?;
        self.snapshots.get(index)
    }

    /// Rates of every window, finest first.
    #[must_use]
    pub fn rates(&self) -> Vec<f64> {
        self.snapshots.iter().map(|snapshot| snapshot.rate).collect()
    }
}

/// Tick-rate profiler.
///
/// # Thread Safety
///
/// The registry sits behind a `RwLock`. [`observe`](Self::observe) holds
/// the read lock while fanning a sample out, so registration never races a
/// partially delivered sample. Each window synchronizes its own state.
pub struct Profiler {
    config: ProfilerConfig,
    windows: RwLock<HashMap<String, Arc<Window>>>,
    observed: AtomicU64,
}

impl Profiler {
    /// Create a profiler with the standard and history windows registered.
    ///
    /// Never fails: invalid intervals fall back to the slot defaults.
    #[must_use]
    pub fn new(config: ProfilerConfig) -> Self {
        let mut windows = HashMap::new();
        for slot in StandardWindow::ALL {
            windows.insert(slot.name().to_string(), Arc::new(config.build_window(slot)));
        }
        windows.insert(
            HISTORY_WINDOW.to_string(),
            Arc::new(config.build_history_window()),
        );

        tracing::debug!(
            windows = windows.len(),
            source = %config.source,
            debug = config.debug,
            "Tick profiler created"
        );

        Self {
            config,
            windows: RwLock::new(windows),
            observed: AtomicU64::new(0),
        }
    }

    /// Validate the configuration, then create a profiler.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::InvalidConfiguration`] if validation fails.
    pub fn try_new(config: ProfilerConfig) -> ProfilerResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// The configuration the profiler was built from.
    #[must_use]
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Deliver a sample to every registered window.
    pub fn observe(&self, sample: Sample) {
        {
            let windows = self.windows.read();
            for window in windows.values() {
                window.add_sample(sample);
            }
        }

        let observed = self.observed.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if self.config.debug
            && self.config.debug_interval_samples > 0
            && observed.is_multiple_of(self.config.debug_interval_samples)
        {
            self.log_debug_report();
        }
    }

    /// Total samples observed since creation.
    #[must_use]
    pub fn observed_count(&self) -> u64 {
        self.observed.load(Ordering::Relaxed)
    }

    /// Register a window under `name`, replacing any existing one.
    ///
    /// The new window starts empty and is unnamed, so its snapshots are
    /// labelled by elapsed time.
    pub fn register_window(&self, name: impl Into<String>, capacity: Capacity) -> Arc<Window> {
        let name = name.into();
        let window = Arc::new(Window::new(capacity));
        let replaced = self
            .windows
            .write()
            .insert(name.clone(), Arc::clone(&window))
            .is_some();
        tracing::debug!(window = %name, ?capacity, replaced, "Registered window");
        window
    }

    /// Remove the window registered under `name`.
    ///
    /// Returns whether a window was removed.
    pub fn unregister_window(&self, name: &str) -> bool {
        let removed = self.windows.write().remove(name).is_some();
        if removed {
            tracing::debug!(window = %name, "Unregistered window");
        }
        removed
    }

    // Remove `name` only if it still refers to `window`.
    fn unregister_exact(&self, name: &str, window: &Arc<Window>) {
        let mut windows = self.windows.write();
        if windows
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, window))
        {
            windows.remove(name);
            tracing::debug!(window = %name, "Measurement window released");
        }
    }

    /// Register an unbounded window that lives until the returned guard is
    /// finished or dropped.
    pub fn begin_measurement(&self, name: impl Into<String>) -> Measurement<'_> {
        let name = name.into();
        let window = self.register_window(name.clone(), Capacity::Unbounded);
        Measurement {
            profiler: self,
            name,
            window,
            released: false,
        }
    }

    /// The window registered under `name`.
    #[must_use]
    pub fn window(&self, name: &str) -> Option<Arc<Window>> {
        self.windows.read().get(name).cloned()
    }

    fn require_window(&self, name: &str) -> ProfilerResult<Arc<Window>> {
        self.window(name)
            .ok_or_else(|| ProfilerError::window_not_found(name))
    }

    /// One of the standard windows.
    #[must_use]
    pub fn standard_window(&self, window: StandardWindow) -> Option<Arc<Window>> {
        self.window(window.name())
    }

    /// Whether a window is registered under `name`.
    #[must_use]
    pub fn contains_window(&self, name: &str) -> bool {
        self.windows.read().contains_key(name)
    }

    /// Names of all registered windows, sorted.
    #[must_use]
    pub fn window_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.windows.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered windows.
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.read().len()
    }

    /// Whole-window snapshot of the window registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::WindowNotFound`] for an unknown name.
    pub fn snapshot(&self, name: &str) -> ProfilerResult<Snapshot> {
        Ok(self.require_window(name)?.snapshot())
    }

    /// Snapshot over the last `ticks` samples of the longest window.
    ///
    /// The request is clamped to the samples available and the snapshot is
    /// named after the clamped count, e.g. `40 ticks`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::WindowNotFound`] if the longest window was
    /// unregistered.
    pub fn snapshot_suffix(&self, ticks: usize) -> ProfilerResult<Snapshot> {
        let window = self.require_window(StandardWindow::Longest.name())?;
        let available = ticks.min(window.len());
        let label = WindowLabel::with_short_name(format!("{available} ticks"), format!("{available}t"));
        Ok(window.build_snapshot(available).with_label(label))
    }

    /// Snapshots of the five standard windows, finest first.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::ReportUnavailable`] naming the first window
    /// with fewer than two samples, or [`ProfilerError::WindowNotFound`] if
    /// a standard window was unregistered.
    pub fn composite_report(&self) -> ProfilerResult<CompositeReport> {
        let mut snapshots = Vec::with_capacity(StandardWindow::ALL.len());
        for slot in StandardWindow::ALL {
            let snapshot = self.require_window(slot.name())?.snapshot();
            if !snapshot.is_valid() {
                return Err(ProfilerError::report_unavailable(snapshot.name));
            }
            snapshots.push(snapshot);
        }
        Ok(CompositeReport { snapshots })
    }

    /// The most recently observed sample.
    #[must_use]
    pub fn most_recent_sample(&self) -> Option<Sample> {
        self.standard_window(StandardWindow::Shortest)?
            .last_sample()
    }

    /// The sample numbered `sequence`, if the shortest window still holds
    /// it.
    #[must_use]
    pub fn sample_by_sequence(&self, sequence: u64) -> Option<Sample> {
        self.standard_window(StandardWindow::Shortest)?
            .sample_by_sequence(sequence)
    }

    /// The most recent `count` samples of the history window, oldest first.
    #[must_use]
    pub fn last_samples(&self, count: usize) -> Vec<Sample> {
        self.window(HISTORY_WINDOW)
            .map(|window| window.last_samples(count))
            .unwrap_or_default()
    }

    /// Every sample in the shortest window, oldest first.
    #[must_use]
    pub fn recent_samples(&self) -> Vec<Sample> {
        self.standard_window(StandardWindow::Shortest)
            .map(|window| window.samples())
            .unwrap_or_default()
    }

    /// Debug view of the longest window, or `None` while it holds fewer
    /// than two samples.
    #[must_use]
    pub fn debug_report(&self) -> Option<DebugReport> {
        let window = self.standard_window(StandardWindow::Longest)?;
        let snapshot = window.snapshot();
        if !snapshot.is_valid() {
            return None;
        }
        let tail = window.last_samples(DEBUG_RECENT_SAMPLES);
        Some(DebugReport::new(snapshot, &tail))
    }

    /// Emit the debug report through `tracing`.
    pub fn log_debug_report(&self) {
        match self.debug_report() {
            Some(report) => report.log(StandardWindow::Longest.name()),
            None => tracing::debug!(
                observed = self.observed_count(),
                "Tick profiler debug report: not enough data"
            ),
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new(ProfilerConfig::default())
    }
}

impl fmt::Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profiler")
            .field("config", &self.config)
            .field("windows", &self.window_names())
            .field("observed", &self.observed_count())
            .finish()
    }
}

/// An ad-hoc measurement window.
///
/// The window receives every sample observed while the guard is alive. It
/// is unregistered by [`finish`](Self::finish) or when the guard drops. If
/// another window has since been registered under the same name, that one
/// is left alone.
#[must_use = "dropping the guard ends the measurement immediately"]
pub struct Measurement<'a> {
    profiler: &'a Profiler,
    name: String,
    window: Arc<Window>,
    released: bool,
}

impl Measurement<'_> {
    /// Registry name of the measurement window.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The measurement window.
    #[must_use]
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Interim snapshot; the measurement continues.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.window.snapshot()
    }

    /// End the measurement and return its final snapshot.
    pub fn finish(mut self) -> Snapshot {
        let snapshot = self.window.snapshot();
        self.release();
        snapshot
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.profiler.unregister_exact(&self.name, &self.window);
        }
    }
}

impl Drop for Measurement<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Measurement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurement")
            .field("name", &self.name)
            .field("samples", &self.window.len())
            .field("released", &self.released)
            .finish()
    }
}
