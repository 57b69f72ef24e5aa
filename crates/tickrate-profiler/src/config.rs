//! Profiler configuration.
//!
//! Loaded from YAML:
//!
//! ```yaml
//! intervals:
//!   shortest: "5 seconds"
//!   short: "1 minutes"
//!   normal: "5 minutes"
//!   long: "15 minutes"
//!   longest: "1 hours"
//! history_capacity: 1200
//! source: auto
//! debug: false
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, ProfilerResult};
use crate::interval::TimeInterval;
use crate::profiler::{HISTORY_WINDOW, StandardWindow};
use crate::snapshot::WindowLabel;
use crate::source::SourceKind;
use crate::window::{Capacity, Window};

/// Default capacity of the per-tick history window.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1200;

/// Default number of samples between periodic debug reports.
pub const DEFAULT_DEBUG_INTERVAL_SAMPLES: u64 = 20;

/// Interval strings for the five standard windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardIntervals {
    /// Finest window, also used for recent-sample lookups.
    pub shortest: String,
    /// Second window.
    pub short: String,
    /// Middle window.
    pub normal: String,
    /// Fourth window.
    pub long: String,
    /// Coarsest window, also used for tick-count reports.
    pub longest: String,
}

impl StandardIntervals {
    /// The configured interval for a standard window.
    #[must_use]
    pub fn get(&self, window: StandardWindow) -> &str {
        match window {
            StandardWindow::Shortest => &self.shortest,
            StandardWindow::Short => &self.short,
            StandardWindow::Normal => &self.normal,
            StandardWindow::Long => &self.long,
            StandardWindow::Longest => &self.longest,
        }
    }

    /// Replace the configured interval for a standard window.
    pub fn set(&mut self, window: StandardWindow, interval: impl Into<String>) {
        let slot = match window {
            StandardWindow::Shortest => &mut self.shortest,
            StandardWindow::Short => &mut self.short,
            StandardWindow::Normal => &mut self.normal,
            StandardWindow::Long => &mut self.long,
            StandardWindow::Longest => &mut self.longest,
        };
        *slot = interval.into();
    }
}

impl Default for StandardIntervals {
    fn default() -> Self {
        Self {
            shortest: StandardWindow::Shortest.default_interval().to_string(),
            short: StandardWindow::Short.default_interval().to_string(),
            normal: StandardWindow::Normal.default_interval().to_string(),
            long: StandardWindow::Long.default_interval().to_string(),
            longest: StandardWindow::Longest.default_interval().to_string(),
        }
    }
}

/// Profiler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Interval strings for the standard windows.
    pub intervals: StandardIntervals,
    /// Capacity of the per-tick history window.
    pub history_capacity: usize,
    /// Timing source a host adapter should use.
    pub source: SourceKind,
    /// Emit a debug report every `debug_interval_samples` samples.
    pub debug: bool,
    /// Samples between debug reports.
    pub debug_interval_samples: u64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            intervals: StandardIntervals::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            source: SourceKind::Auto,
            debug: false,
            debug_interval_samples: DEFAULT_DEBUG_INTERVAL_SAMPLES,
        }
    }
}

impl ProfilerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a standard interval cannot be parsed or a
    /// capacity or period is zero.
    pub fn validate(&self) -> ProfilerResult<()> {
        for window in StandardWindow::ALL {
            let interval = self.intervals.get(window);
            match TimeInterval::parse(interval) {
                Err(_) => {
                    return Err(ProfilerError::invalid_configuration(format!(
                        "{window} interval '{interval}' is not of the form '<integer> <unit>'"
                    )));
                }
                Ok(parsed) if parsed.sample_count() <= 0 => {
                    return Err(ProfilerError::invalid_configuration(format!(
                        "{window} interval '{interval}' spans less than one sample"
                    )));
                }
                Ok(_) => {}
            }
        }
        if self.history_capacity == 0 {
            return Err(ProfilerError::invalid_configuration(
                "history_capacity must be greater than 0",
            ));
        }
        if self.debug_interval_samples == 0 {
            return Err(ProfilerError::invalid_configuration(
                "debug_interval_samples must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder::default()
    }

    /// Decode a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::ConfigLoad`] if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> ProfilerResult<Self> {
        serde_yaml::from_str(yaml).map_err(ProfilerError::config_load)
    }

    /// Read and decode a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::ConfigLoad`] if the file cannot be read or
    /// decoded.
    pub fn from_path(path: impl AsRef<Path>) -> ProfilerResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|err| ProfilerError::config_load(format!("{}: {err}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    /// Encode the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::ConfigLoad`] if encoding fails.
    pub fn to_yaml_string(&self) -> ProfilerResult<String> {
        serde_yaml::to_string(self).map_err(ProfilerError::config_load)
    }

    /// Build the window for a standard slot.
    ///
    /// An interval that cannot be parsed, or that spans less than one
    /// sample, falls back to the slot's default interval.
    #[must_use]
    pub fn build_window(&self, window: StandardWindow) -> Window {
        let interval = self.intervals.get(window);
        match standard_interval(interval) {
            Ok(parsed) => {
                Window::labelled(WindowLabel::new(interval), Capacity::spanning(&parsed))
            }
            Err(err) => {
                let fallback = window.default_interval();
                tracing::warn!(
                    window = %window,
                    interval = %interval,
                    fallback = %fallback,
                    error = %err,
                    "Invalid window interval, using default"
                );
                Window::spanning(fallback)
            }
        }
    }

    /// Build the per-tick history window.
    ///
    /// A zero capacity falls back to [`DEFAULT_HISTORY_CAPACITY`].
    #[must_use]
    pub fn build_history_window(&self) -> Window {
        let capacity = if self.history_capacity == 0 {
            tracing::warn!(
                fallback = DEFAULT_HISTORY_CAPACITY,
                "history_capacity is 0, using default"
            );
            DEFAULT_HISTORY_CAPACITY
        } else {
            self.history_capacity
        };
        Window::labelled(
            WindowLabel::with_short_name(HISTORY_WINDOW, "t"),
            Capacity::Bounded(capacity),
        )
    }
}

/// Parse a standard window interval, rejecting intervals that round down
/// to an empty window.
fn standard_interval(interval: &str) -> ProfilerResult<TimeInterval> {
    let parsed = TimeInterval::parse(interval)?;
    if parsed.sample_count() <= 0 {
        return Err(ProfilerError::invalid_interval(interval));
    }
    Ok(parsed)
}

/// Builder for `ProfilerConfig`.
#[derive(Debug, Default)]
pub struct ProfilerConfigBuilder {
    config: ProfilerConfig,
}

impl ProfilerConfigBuilder {
    /// Set the interval of one standard window.
    #[must_use]
    pub fn interval(mut self, window: StandardWindow, interval: impl Into<String>) -> Self {
        self.config.intervals.set(window, interval);
        self
    }

    /// Set the shortest window interval.
    #[must_use]
    pub fn shortest(self, interval: impl Into<String>) -> Self {
        self.interval(StandardWindow::Shortest, interval)
    }

    /// Set the longest window interval.
    #[must_use]
    pub fn longest(self, interval: impl Into<String>) -> Self {
        self.interval(StandardWindow::Longest, interval)
    }

    /// Set the history window capacity.
    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Set the timing source.
    #[must_use]
    pub fn source(mut self, source: SourceKind) -> Self {
        self.config.source = source;
        self
    }

    /// Enable or disable periodic debug reports.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Set the number of samples between debug reports.
    #[must_use]
    pub fn debug_interval_samples(mut self, samples: u64) -> Self {
        self.config.debug_interval_samples = samples;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> ProfilerResult<ProfilerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
