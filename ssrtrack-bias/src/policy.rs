//! Classification and concern-window policy for ACIS bias intervals.
//!
//! Bias intervals taken during TE-mode observations are sensitive to a
//! recorder transition during two windows, whose placement depends on
//! whether the bias is short or long; CC-mode biases have one window that
//! spans the whole interval plus a tail.

use std::fmt;

use serde::{Deserialize, Serialize};
use ssrtrack_core::MissionTime;

use crate::error::{Error, Result};

/// Interval class derived from label family and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Short-family label, duration at or under the long threshold.
    Short,
    /// Short-family label, duration over the long threshold.
    Long,
    /// Continuous-family label.
    Continuous,
    /// Label matched no family; no concern windows.
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Short => "TE_SHORT",
            Self::Long => "TE_LONG",
            Self::Continuous => "CC",
            Self::Unknown => "UNK",
        };
        f.write_str(name)
    }
}

/// Reference point inside an interval that a window bound is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Interval start.
    Start,
    /// Interval stop.
    Stop,
    /// Halfway between start and stop.
    Midpoint,
}

/// One end of a concern window: an anchor plus a signed offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBound {
    /// Anchor within the interval.
    pub anchor: Anchor,
    /// Offset from the anchor in seconds.
    pub offset_secs: f64,
}

impl WindowBound {
    /// Bound measured from the interval start.
    #[must_use]
    pub fn after_start(offset_secs: f64) -> Self {
        Self {
            anchor: Anchor::Start,
            offset_secs,
        }
    }

    /// Bound measured from the interval stop.
    #[must_use]
    pub fn after_stop(offset_secs: f64) -> Self {
        Self {
            anchor: Anchor::Stop,
            offset_secs,
        }
    }

    /// Bound at the interval midpoint.
    #[must_use]
    pub fn midpoint() -> Self {
        Self {
            anchor: Anchor::Midpoint,
            offset_secs: 0.0,
        }
    }

    /// Resolves the bound against concrete interval limits.
    #[must_use]
    pub fn resolve(&self, start: &MissionTime, stop: &MissionTime) -> MissionTime {
        let base = match self.anchor {
            Anchor::Start => *start,
            Anchor::Stop => *stop,
            Anchor::Midpoint => MissionTime::midpoint(start, stop),
        };
        base.offset_secs(self.offset_secs)
    }
}

/// A concern window definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Window start.
    pub from: WindowBound,
    /// Window end.
    pub to: WindowBound,
}

impl WindowSpec {
    /// Creates a window spec.
    #[must_use]
    pub fn new(from: WindowBound, to: WindowBound) -> Self {
        Self { from, to }
    }
}

/// Classification thresholds and per-class window definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcernPolicy {
    /// Label prefix of the short/long family (TE mode).
    pub short_prefix: String,
    /// Label prefix of the continuous family (CC mode).
    pub continuous_prefix: String,
    /// Durations strictly above this are `Long`.
    pub long_threshold_secs: f64,
    /// Intervals starting more than this after the epoch are stale.
    pub stale_horizon_secs: f64,
    /// Windows for `Short` intervals.
    pub short_windows: Vec<WindowSpec>,
    /// Windows for `Long` intervals.
    pub long_windows: Vec<WindowSpec>,
    /// Windows for `Continuous` intervals.
    pub continuous_windows: Vec<WindowSpec>,
}

impl Default for ConcernPolicy {
    fn default() -> Self {
        Self::chandra_defaults()
    }
}

impl ConcernPolicy {
    /// ACIS bias policy used for the Chandra SSRs.
    #[must_use]
    pub fn chandra_defaults() -> Self {
        let first_frame = WindowSpec::new(
            WindowBound::after_start(60.0),
            WindowBound::after_start(120.0),
        );
        Self {
            short_prefix: "TE".to_string(),
            continuous_prefix: "CC".to_string(),
            long_threshold_secs: 24.0 * 60.0,
            stale_horizon_secs: 18.0 * 3600.0,
            short_windows: vec![
                first_frame,
                WindowSpec::new(WindowBound::midpoint(), WindowBound::after_stop(120.0)),
            ],
            long_windows: vec![
                first_frame,
                WindowSpec::new(
                    WindowBound::after_start(12.0 * 60.0),
                    WindowBound::after_stop(4.0 * 60.0),
                ),
            ],
            continuous_windows: vec![WindowSpec::new(
                WindowBound::after_start(60.0),
                WindowBound::after_stop(536.0),
            )],
        }
    }

    /// Checks thresholds, prefixes, and offsets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.short_prefix.is_empty() || self.continuous_prefix.is_empty() {
            return Err(Error::ConfigError(
                "label family prefixes must not be empty".to_string(),
            ));
        }
        if !self.long_threshold_secs.is_finite() || self.long_threshold_secs <= 0.0 {
            return Err(Error::ConfigError(format!(
                "long threshold must be positive, got {}",
                self.long_threshold_secs
            )));
        }
        if !self.stale_horizon_secs.is_finite() || self.stale_horizon_secs <= 0.0 {
            return Err(Error::ConfigError(format!(
                "stale horizon must be positive, got {}",
                self.stale_horizon_secs
            )));
        }
        let all_windows = self
            .short_windows
            .iter()
            .chain(&self.long_windows)
            .chain(&self.continuous_windows);
        for spec in all_windows {
            if !spec.from.offset_secs.is_finite() || !spec.to.offset_secs.is_finite() {
                return Err(Error::ConfigError(
                    "concern window offsets must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Classifies an interval by label family and duration.
    #[must_use]
    pub fn classify(&self, label: &str, duration_secs: f64) -> Classification {
        if label.starts_with(&self.short_prefix) {
            if duration_secs > self.long_threshold_secs {
                Classification::Long
            } else {
                Classification::Short
            }
        } else if label.starts_with(&self.continuous_prefix) {
            Classification::Continuous
        } else {
            Classification::Unknown
        }
    }

    /// Window definitions for a classification (empty for `Unknown`).
    #[must_use]
    pub fn windows_for(&self, classification: Classification) -> &[WindowSpec] {
        match classification {
            Classification::Short => &self.short_windows,
            Classification::Long => &self.long_windows,
            Classification::Continuous => &self.continuous_windows,
            Classification::Unknown => &[],
        }
    }
}
