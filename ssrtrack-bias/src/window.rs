//! Concern-window derivation.
//!
//! Each classified interval expands into the policy's windows; both ends of
//! every window are mapped onto recorder addresses through the active
//! pointer correlator so the operator can see which part of the buffer a
//! playback will touch.

use serde::{Deserialize, Serialize};
use ssrtrack_core::{Address, MissionTime, PointerCorrelator};

use crate::interval::Interval;
use crate::policy::ConcernPolicy;

/// A time window of operational interest and its recorder addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcernWindow {
    /// Window start time.
    pub start: MissionTime,
    /// Window stop time.
    pub stop: MissionTime,
    /// Record pointer address at `start`.
    pub address_start: Address,
    /// Record pointer address at `stop`.
    pub address_stop: Address,
}

/// An interval with its addresses and concern windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasRange {
    /// The source interval.
    pub interval: Interval,
    /// Record pointer address at the interval start.
    pub address_start: Address,
    /// Record pointer address at the interval stop.
    pub address_stop: Address,
    /// Concern windows in policy order.
    pub windows: Vec<ConcernWindow>,
}

/// Applies a concern policy using one correlator.
#[derive(Debug, Clone, Copy)]
pub struct ConcernDeriver<'a> {
    correlator: &'a PointerCorrelator,
    policy: &'a ConcernPolicy,
}

impl<'a> ConcernDeriver<'a> {
    /// Creates a deriver.
    #[must_use]
    pub fn new(correlator: &'a PointerCorrelator, policy: &'a ConcernPolicy) -> Self {
        Self { correlator, policy }
    }

    /// Concern windows for one interval; empty for unknown classifications.
    #[must_use]
    pub fn derive_concern_windows(&self, interval: &Interval) -> Vec<ConcernWindow> {
        self.policy
            .windows_for(interval.classification)
            .iter()
            .map(|spec| {
                let start = spec.from.resolve(&interval.start, &interval.stop);
                let stop = spec.to.resolve(&interval.start, &interval.stop);
                ConcernWindow {
                    start,
                    stop,
                    address_start: self.correlator.address_at_time(&start),
                    address_stop: self.correlator.address_at_time(&stop),
                }
            })
            .collect()
    }

    /// Addresses and concern windows for one interval.
    #[must_use]
    pub fn bias_range(&self, interval: Interval) -> BiasRange {
        let windows = self.derive_concern_windows(&interval);
        BiasRange {
            address_start: self.correlator.address_at_time(&interval.start),
            address_stop: self.correlator.address_at_time(&interval.stop),
            windows,
            interval,
        }
    }

    /// Bias ranges for every interval not stale relative to `epoch`.
    ///
    /// `epoch` is normally the end of the last playback: anything starting
    /// more than the stale horizon after it has already rolled off.
    pub fn plan<I>(&self, intervals: I, epoch: &MissionTime) -> Vec<BiasRange>
    where
        I: IntoIterator<Item = Interval>,
    {
        let mut dropped = 0usize;
        let ranges: Vec<BiasRange> = intervals
            .into_iter()
            .filter(|interval| {
                let stale = interval.is_stale(epoch, self.policy);
                if stale {
                    log::debug!("dropping stale interval {} at {}", interval.label, interval.start);
                    dropped += 1;
                }
                !stale
            })
            .map(|interval| self.bias_range(interval))
            .collect();
        if dropped > 0 {
            log::warn!("dropped {dropped} interval(s) past the stale horizon from {epoch}");
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Classification;
    use ssrtrack_core::{AddressSpace, ReferenceSample};

    fn t(text: &str) -> MissionTime {
        MissionTime::from_yday(text).unwrap()
    }

    fn correlator() -> PointerCorrelator {
        let space = AddressSpace::chandra_defaults();
        let reference = ReferenceSample::new(t("2024:001:00:00:00"), 0, &space).unwrap();
        PointerCorrelator::new(space, reference).unwrap()
    }

    #[test]
    fn test_continuous_window() {
        let corr = correlator();
        let policy = ConcernPolicy::chandra_defaults();
        let deriver = ConcernDeriver::new(&corr, &policy);
        let interval = Interval::new(
            t("2024:001:00:00:00"),
            t("2024:001:00:05:00"),
            "CC_1",
            &policy,
        );

        let windows = deriver.derive_concern_windows(&interval);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, t("2024:001:00:01:00"));
        assert_eq!(windows[0].stop, t("2024:001:00:13:56"));
        assert_eq!(windows[0].address_start, Address(120_000));
        assert_eq!(windows[0].address_stop, Address(836 * 2000));
    }

    #[test]
    fn test_long_window_offsets() {
        let corr = correlator();
        let policy = ConcernPolicy::chandra_defaults();
        let deriver = ConcernDeriver::new(&corr, &policy);
        let interval = Interval::new(
            t("2024:001:00:00:00"),
            t("2024:001:01:00:00"),
            "TE_1",
            &policy,
        );
        assert_eq!(interval.classification, Classification::Long);

        let windows = deriver.derive_concern_windows(&interval);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, t("2024:001:00:01:00"));
        assert_eq!(windows[0].stop, t("2024:001:00:02:00"));
        assert_eq!(windows[1].start, t("2024:001:00:12:00"));
        assert_eq!(windows[1].stop, t("2024:001:01:04:00"));
    }

    #[test]
    fn test_unknown_has_no_windows() {
        let corr = correlator();
        let policy = ConcernPolicy::chandra_defaults();
        let deriver = ConcernDeriver::new(&corr, &policy);
        let interval = Interval::new(
            t("2024:001:00:00:00"),
            t("2024:001:00:05:00"),
            "UNK",
            &policy,
        );
        assert!(deriver.derive_concern_windows(&interval).is_empty());

        let range = deriver.bias_range(interval);
        assert_eq!(range.address_start, Address(0));
        assert_eq!(range.address_stop, Address(600_000));
    }

    #[test]
    fn test_plan_drops_stale() {
        let corr = correlator();
        let policy = ConcernPolicy::chandra_defaults();
        let deriver = ConcernDeriver::new(&corr, &policy);
        let epoch = t("2024:001:00:00:00");
        let intervals = vec![
            Interval::new(t("2024:001:02:00:00"), t("2024:001:02:05:00"), "TE_A", &policy),
            Interval::new(t("2024:001:19:00:00"), t("2024:001:19:05:00"), "TE_B", &policy),
        ];
        let ranges = deriver.plan(intervals, &epoch);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].interval.label, "TE_A");
        assert_eq!(ranges[0].windows.len(), 2);
    }
}
