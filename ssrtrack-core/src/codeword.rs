//! Bad codeword hit detection from decoder error counters.
//!
//! Two ground error counters are watched. The playback counter (`M1466`)
//! only means a recorder hit while playback is enabled; the second counter
//! (`M1966`) counts at any time. Each increment is a hit stamped with the
//! playback pointer of the same sample. Hits are grouped by playback pass:
//! a pass ends when playback enable drops.

use crate::address::Address;
use crate::time::MissionTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A bad codeword hit: the playback pointer at the time the hit was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BadCodeword {
    /// Playback pointer address when the error counter incremented.
    pub address: Address,
    /// Ground time of the counter increment.
    pub observed_at: MissionTime,
}

/// One joint sample of playback state and error counters.
///
/// Counters are `None` when the channel had no new value in this sample;
/// the previous value carries forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodewordSample {
    /// Sample time.
    pub time: MissionTime,
    /// Playback pointer.
    pub playback: Address,
    /// Playback enable.
    pub playback_enabled: bool,
    /// Playback error counter (`M1466`), counted only during playback.
    #[cfg_attr(feature = "serde", serde(default))]
    pub playback_errors: Option<u64>,
    /// Error counter (`M1966`), counted at any time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub errors: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassState {
    Idle,
    PlayingBack,
}

/// Streaming bad codeword detector.
#[derive(Debug, Clone)]
pub struct CodewordDetector {
    state: PassState,
    last_playback_errors: Option<u64>,
    last_errors: Option<u64>,
    hits: Vec<BadCodeword>,
    pass_start: usize,
}

impl Default for CodewordDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CodewordDetector {
    /// Creates a detector with no counter baseline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PassState::Idle,
            last_playback_errors: None,
            last_errors: None,
            hits: Vec::new(),
            pass_start: 0,
        }
    }

    /// Feeds one sample (chronological order).
    ///
    /// The first value seen on each counter only sets its baseline.
    pub fn push(&mut self, sample: CodewordSample) {
        let hit = BadCodeword {
            address: sample.playback,
            observed_at: sample.time,
        };

        self.state = match (self.state, sample.playback_enabled) {
            (PassState::Idle, true) => {
                log::debug!("playback started at {}", sample.time);
                PassState::PlayingBack
            }
            (PassState::PlayingBack, false) => {
                log::debug!(
                    "playback ended at {} with {} hit(s)",
                    sample.time,
                    self.current_pass().len()
                );
                self.pass_start = self.hits.len();
                PassState::Idle
            }
            (state, _) => state,
        };

        if increments(&mut self.last_playback_errors, sample.playback_errors)
            && self.state == PassState::PlayingBack
        {
            self.hits.push(hit);
        }
        if increments(&mut self.last_errors, sample.errors) {
            self.hits.push(hit);
        }
    }

    /// Hits since the last playback ended.
    #[must_use]
    pub fn current_pass(&self) -> &[BadCodeword] {
        &self.hits[self.pass_start..]
    }

    /// Every hit seen so far.
    #[must_use]
    pub fn hits(&self) -> &[BadCodeword] {
        &self.hits
    }

    /// Finishes the stream, returning every hit.
    #[must_use]
    pub fn finish(self) -> Vec<BadCodeword> {
        self.hits
    }
}

fn increments(last: &mut Option<u64>, value: Option<u64>) -> bool {
    let Some(value) = value else {
        return false;
    };
    matches!(last.replace(value), Some(previous) if value > previous)
}

/// Detects all bad codeword hits in a chronologically ordered sample sequence.
#[must_use]
pub fn detect_bad_codewords<I>(samples: I) -> Vec<BadCodeword>
where
    I: IntoIterator<Item = CodewordSample>,
{
    let mut detector = CodewordDetector::new();
    for sample in samples {
        detector.push(sample);
    }
    let hits = detector.finish();
    log::debug!("detected {} bad codeword hit(s)", hits.len());
    hits
}
