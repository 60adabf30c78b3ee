//! Recorder identity, playback backlog, and downlink rate helpers.
#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::str::FromStr;

use crate::address::{Address, AddressSpace};
use crate::correlator::{Direction, PointerCorrelator};
use crate::error::{Error, Result};
use crate::swap::EnableSample;
use crate::time::MissionTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bits per recorder word.
pub const BITS_PER_WORD: f64 = 16.0;

/// One of the two solid state recorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecorderId {
    /// SSR-A.
    A,
    /// SSR-B.
    B,
}

impl RecorderId {
    /// The other recorder.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Record pointer MSID (`COSARCPT` / `COSBRCPT`).
    #[must_use]
    pub fn record_pointer_msid(&self) -> String {
        format!("COS{self}RCPT")
    }

    /// Playback pointer MSID (`COSAPBPT` / `COSBPBPT`).
    #[must_use]
    pub fn playback_pointer_msid(&self) -> String {
        format!("COS{self}PBPT")
    }

    /// Playback enable MSID (`COSAPBEN` / `COSBPBEN`).
    #[must_use]
    pub fn playback_enable_msid(&self) -> String {
        format!("COS{self}PBEN")
    }

    /// Record enable MSID (`COSARCEN` / `COSBRCEN`).
    #[must_use]
    pub fn record_enable_msid(&self) -> String {
        format!("COS{self}RCEN")
    }
}

impl fmt::Display for RecorderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

impl FromStr for RecorderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches("SSR-").to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(Error::ConfigError(format!("unknown recorder {other:?}"))),
        }
    }
}

/// Downlink bit rate for a telemetry format code (`CIUMBITR`).
///
/// Code 0 is the 2 kbps rate; every other code `n` is `2^(n+4)` kbps.
#[must_use]
pub fn downlink_bits_per_second(format_code: u8) -> f64 {
    if format_code == 0 {
        2000.0
    } else {
        2f64.powi(i32::from(format_code) + 4) * 1000.0
    }
}

/// Simultaneous record and playback pointer values for one recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaybackState {
    /// Record pointer.
    pub record: Address,
    /// Playback pointer.
    pub playback: Address,
}

impl PlaybackState {
    /// Creates a playback state.
    #[must_use]
    pub fn new(record: Address, playback: Address) -> Self {
        Self { record, playback }
    }

    /// Words recorded but not yet played back.
    #[must_use]
    pub fn backlog_words(&self, space: &AddressSpace) -> u64 {
        space.forward_distance(self.playback, self.record)
    }

    /// Seconds of downlink needed to play back the backlog at `bits_per_second`.
    #[must_use]
    pub fn remaining_playback_secs(&self, space: &AddressSpace, bits_per_second: f64) -> f64 {
        BITS_PER_WORD * self.backlog_words(space) as f64 / bits_per_second
    }

    /// Seconds of spacecraft time covered by the backlog at the record rate.
    #[must_use]
    pub fn recorded_span_secs(&self, space: &AddressSpace) -> f64 {
        space.seconds_for(self.backlog_words(space))
    }

    /// Spacecraft time at which the data now being played back was recorded.
    ///
    /// The playback pointer always trails the record pointer, so this is a
    /// backward correlation against the record-pointer reference.
    #[must_use]
    pub fn playback_record_time(&self, correlator: &PointerCorrelator) -> MissionTime {
        correlator.time_at_address(self.playback, Direction::Backward)
    }
}

/// End of the last playback in a playback-enable history.
///
/// Enable telemetry is reported on change, so the last disabled sample marks
/// where the most recent playback stopped. `None` if playback was never
/// disabled in `samples`.
#[must_use]
pub fn last_playback_time(samples: &[EnableSample]) -> Option<MissionTime> {
    samples
        .iter()
        .rev()
        .find(|sample| !sample.enabled)
        .map(|sample| sample.time)
}

/// Picks the recorder whose last playback is most recent.
///
/// Returns `None` when neither recorder has played back since `window_start`.
/// Ties go to SSR-B.
#[must_use]
pub fn select_last_playback(
    window_start: &MissionTime,
    last_a: Option<MissionTime>,
    last_b: Option<MissionTime>,
) -> Option<(RecorderId, MissionTime)> {
    let latest = match (last_a, last_b) {
        (None, None) => {
            log::warn!("no playbacks present for either recorder");
            return None;
        }
        (Some(a), None) => (RecorderId::A, a),
        (None, Some(b)) => (RecorderId::B, b),
        (Some(a), Some(b)) => {
            if a > b {
                (RecorderId::A, a)
            } else {
                (RecorderId::B, b)
            }
        }
    };
    (latest.1 > *window_start).then_some(latest)
}

/// Latest pointer value and the most recent different value before it.
///
/// `values` is in chronological order.
#[must_use]
pub fn current_and_previous(values: &[u64]) -> (Option<u64>, Option<u64>) {
    let Some(&current) = values.last() else {
        return (None, None);
    };
    let previous = values.iter().rev().copied().find(|v| *v != current);
    (Some(current), previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlator::ReferenceSample;
    use approx::assert_abs_diff_eq;

    fn t(text: &str) -> MissionTime {
        MissionTime::from_yday(text).unwrap()
    }

    #[test]
    fn test_msid_names() {
        assert_eq!(RecorderId::A.record_pointer_msid(), "COSARCPT");
        assert_eq!(RecorderId::B.playback_pointer_msid(), "COSBPBPT");
        assert_eq!(RecorderId::A.playback_enable_msid(), "COSAPBEN");
        assert_eq!(RecorderId::B.record_enable_msid(), "COSBRCEN");
        assert_eq!(RecorderId::A.other(), RecorderId::B);
        assert_eq!("ssr-b".parse::<RecorderId>().unwrap(), RecorderId::B);
        assert!("C".parse::<RecorderId>().is_err());
    }

    #[test]
    fn test_downlink_rates() {
        assert_abs_diff_eq!(downlink_bits_per_second(0), 2000.0);
        assert_abs_diff_eq!(downlink_bits_per_second(1), 32_000.0);
        assert_abs_diff_eq!(downlink_bits_per_second(5), 512_000.0);
    }

    #[test]
    fn test_backlog_wraps() {
        let space = AddressSpace::new(1000, 2.0).unwrap();
        let state = PlaybackState::new(Address(100), Address(900));
        assert_eq!(state.backlog_words(&space), 200);
        assert_abs_diff_eq!(state.recorded_span_secs(&space), 100.0);
        assert_abs_diff_eq!(state.remaining_playback_secs(&space, 32.0), 100.0);
    }

    #[test]
    fn test_playback_record_time() {
        let space = AddressSpace::chandra_defaults();
        let reference = ReferenceSample::new(t("2024:001:01:00:00"), 7_200_000, &space).unwrap();
        let corr = PointerCorrelator::new(space, reference).unwrap();
        let state = PlaybackState::new(Address(7_200_000), Address(0));
        assert_eq!(state.playback_record_time(&corr), t("2024:001:00:00:00"));
    }

    #[test]
    fn test_select_last_playback() {
        let start = t("2024:001:00:00:00");
        let early = t("2023:365:00:00:00");
        let a = t("2024:001:02:00:00");
        let b = t("2024:001:03:00:00");

        assert_eq!(select_last_playback(&start, None, None), None);
        assert_eq!(
            select_last_playback(&start, Some(a), None),
            Some((RecorderId::A, a))
        );
        assert_eq!(
            select_last_playback(&start, Some(a), Some(b)),
            Some((RecorderId::B, b))
        );
        assert_eq!(
            select_last_playback(&start, Some(b), Some(a)),
            Some((RecorderId::A, b))
        );
        assert_eq!(select_last_playback(&start, Some(early), None), None);
    }

    #[test]
    fn test_last_playback_feeds_selection() {
        let enable = |text: &str, enabled: bool| EnableSample {
            time: t(text),
            enabled,
        };
        let ssr_a = [
            enable("2024:001:00:30:00", true),
            enable("2024:001:01:10:00", false),
            enable("2024:001:05:00:00", true),
        ];
        let ssr_b = [
            enable("2024:001:02:00:00", true),
            enable("2024:001:02:45:00", false),
        ];
        assert_eq!(last_playback_time(&ssr_a), Some(t("2024:001:01:10:00")));
        assert_eq!(last_playback_time(&ssr_b), Some(t("2024:001:02:45:00")));
        assert_eq!(last_playback_time(&ssr_a[..1]), None);
        assert_eq!(last_playback_time(&[]), None);

        let start = t("2024:001:00:00:00");
        assert_eq!(
            select_last_playback(&start, last_playback_time(&ssr_a), last_playback_time(&ssr_b)),
            Some((RecorderId::B, t("2024:001:02:45:00")))
        );
    }

    #[test]
    fn test_current_and_previous() {
        assert_eq!(current_and_previous(&[]), (None, None));
        assert_eq!(current_and_previous(&[5, 5, 5]), (Some(5), None));
        assert_eq!(current_and_previous(&[3, 4, 4, 5, 5]), (Some(5), Some(4)));
    }
}
