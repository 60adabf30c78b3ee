//! Recorded data intervals of interest.

use serde::{Deserialize, Serialize};
use ssrtrack_core::MissionTime;

use crate::policy::{Classification, ConcernPolicy};

/// One recorded data segment (e.g. an ACIS bias packet interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Interval start.
    pub start: MissionTime,
    /// Interval stop.
    pub stop: MissionTime,
    /// Label from the external catalog (observation mode).
    pub label: String,
    /// Duration used for classification, in seconds.
    pub duration_secs: f64,
    /// Class assigned by the policy.
    pub classification: Classification,
}

impl Interval {
    /// Creates and classifies an interval whose duration is `stop - start`.
    #[must_use]
    pub fn new(
        start: MissionTime,
        stop: MissionTime,
        label: impl Into<String>,
        policy: &ConcernPolicy,
    ) -> Self {
        let duration_secs = stop.seconds_since(&start);
        Self::with_duration(start, stop, label, duration_secs, policy)
    }

    /// Creates and classifies an interval with a catalog-supplied duration.
    #[must_use]
    pub fn with_duration(
        start: MissionTime,
        stop: MissionTime,
        label: impl Into<String>,
        duration_secs: f64,
        policy: &ConcernPolicy,
    ) -> Self {
        let label = label.into();
        if stop < start {
            log::warn!("interval {label} stops at {stop}, before its start {start}");
        }
        let classification = policy.classify(&label, duration_secs);
        if classification == Classification::Unknown {
            log::warn!("unclassifiable interval {label:?} at {start}; no concern windows");
        } else {
            log::debug!("interval {label} at {start} ({duration_secs:.0} s) is {classification}");
        }
        Self {
            start,
            stop,
            label,
            duration_secs,
            classification,
        }
    }

    /// Instant halfway through the interval.
    #[must_use]
    pub fn midpoint(&self) -> MissionTime {
        MissionTime::midpoint(&self.start, &self.stop)
    }

    /// True when the interval starts more than the policy horizon after `epoch`.
    #[must_use]
    pub fn is_stale(&self, epoch: &MissionTime, policy: &ConcernPolicy) -> bool {
        self.start.seconds_since(epoch) > policy.stale_horizon_secs
    }
}
