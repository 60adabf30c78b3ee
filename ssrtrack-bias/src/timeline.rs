//! Time-ordered pointer timeline: the rows behind the operator table.

use std::fmt;

use serde::{Deserialize, Serialize};
use ssrtrack_core::{Address, BadCodeword, Direction, MissionTime, PointerCorrelator};

use crate::policy::Classification;
use crate::window::BiasRange;

/// What a timeline row marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Start of a bias interval.
    BiasStart(Classification),
    /// Stop of a bias interval.
    BiasStop(Classification),
    /// Start of the n-th concern window (1-based) of an interval.
    ConcernStart(usize),
    /// Stop of the n-th concern window (1-based) of an interval.
    ConcernStop(usize),
    /// Current playback pointer.
    PlaybackPointer,
    /// Bad codeword seen during playback.
    BadCodeword,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BiasStart(class) => write!(f, "AC Bias Start - {class}"),
            Self::BiasStop(class) => write!(f, "AC Bias Stop - {class}"),
            Self::ConcernStart(n) => write!(f, "CON# {n} - Start"),
            Self::ConcernStop(n) => write!(f, "CON# {n} - Stop"),
            Self::PlaybackPointer => f.write_str("PB POINTER"),
            Self::BadCodeword => f.write_str("BCW"),
        }
    }
}

/// Row status relative to the playback pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Recorded after the data now being played back.
    Pending,
    /// Already passed by the playback pointer.
    PlayedBack,
    /// The playback pointer row itself.
    PlaybackPointer,
    /// A bad codeword row.
    BadCodeword,
}

/// One timeline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Spacecraft record time.
    pub time: MissionTime,
    /// Recorder address.
    pub address: Address,
    /// Row type.
    pub kind: EntryKind,
    /// Observation label or annotation.
    pub label: String,
    /// Status relative to the playback pointer.
    pub status: EntryStatus,
}

/// Time-ordered rows for one recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Builds the timeline from planned bias ranges and playback state.
    ///
    /// The playback pointer and bad codeword addresses trail the record
    /// pointer, so their record times come from backward correlation.
    #[must_use]
    pub fn build(
        ranges: &[BiasRange],
        playback: Address,
        bad_codewords: &[BadCodeword],
        correlator: &PointerCorrelator,
    ) -> Self {
        let mut entries = Vec::with_capacity(ranges.len() * 6 + bad_codewords.len() + 1);

        for range in ranges {
            let class = range.interval.classification;
            let label = &range.interval.label;
            entries.push(pending(
                range.interval.start,
                range.address_start,
                EntryKind::BiasStart(class),
                label,
            ));
            entries.push(pending(
                range.interval.stop,
                range.address_stop,
                EntryKind::BiasStop(class),
                label,
            ));
            for (idx, window) in range.windows.iter().enumerate() {
                let n = idx + 1;
                entries.push(pending(
                    window.start,
                    window.address_start,
                    EntryKind::ConcernStart(n),
                    label,
                ));
                entries.push(pending(
                    window.stop,
                    window.address_stop,
                    EntryKind::ConcernStop(n),
                    label,
                ));
            }
        }

        let playback_time = correlator.time_at_address(playback, Direction::Backward);
        for entry in &mut entries {
            if entry.time < playback_time {
                entry.status = EntryStatus::PlayedBack;
            }
        }
        entries.push(TimelineEntry {
            time: playback_time,
            address: playback,
            kind: EntryKind::PlaybackPointer,
            label: "LATEST PB".to_string(),
            status: EntryStatus::PlaybackPointer,
        });

        for bcw in bad_codewords {
            entries.push(TimelineEntry {
                time: correlator.time_at_address(bcw.address, Direction::Backward),
                address: bcw.address,
                kind: EntryKind::BadCodeword,
                label: format!("seen {}", bcw.observed_at),
                status: EntryStatus::BadCodeword,
            });
        }

        entries.sort_by_key(|entry| entry.time);
        Self { entries }
    }

    /// All rows in time order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// Rows not yet reached by the playback pointer.
    pub fn pending(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Pending)
    }
}

fn pending(time: MissionTime, address: Address, kind: EntryKind, label: &str) -> TimelineEntry {
    TimelineEntry {
        time,
        address,
        kind,
        label: label.to_string(),
        status: EntryStatus::Pending,
    }
}
