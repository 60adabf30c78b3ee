//! Prime recorder swap detection from record-enable telemetry.
//!
//! When the prime SSR stops recording (record enable drops), the backup
//! takes over; recovery is the enable rising again. Samples are fed through
//! an explicit two-state machine rather than scanned for value pairs.

use crate::time::MissionTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One enable-flag telemetry sample (record enable or playback enable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnableSample {
    /// Sample time.
    pub time: MissionTime,
    /// Flag value; for swap detection, true while the prime recorder records.
    pub enabled: bool,
}

/// A prime-to-backup swap and its recovery, either of which may fall outside
/// the sampled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecorderSwap {
    /// When recording moved to the backup recorder.
    pub to_backup: Option<MissionTime>,
    /// When recording returned to the prime recorder.
    pub to_prime: Option<MissionTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapState {
    Idle,
    OnBackup(MissionTime),
}

/// Streaming swap detector.
#[derive(Debug, Clone)]
pub struct SwapDetector {
    state: SwapState,
    last_enabled: Option<bool>,
    swaps: Vec<RecorderSwap>,
}

impl Default for SwapDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapDetector {
    /// Creates a detector with no history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SwapState::Idle,
            last_enabled: None,
            swaps: Vec::new(),
        }
    }

    /// Feeds one sample (chronological order).
    pub fn push(&mut self, sample: EnableSample) {
        let previous = self.last_enabled.replace(sample.enabled);
        let Some(previous) = previous else {
            return;
        };

        match (self.state, previous, sample.enabled) {
            (SwapState::Idle, true, false) => {
                self.state = SwapState::OnBackup(sample.time);
            }
            (SwapState::Idle, false, true) => {
                // Swap happened before the first sample
                self.swaps.push(RecorderSwap {
                    to_backup: None,
                    to_prime: Some(sample.time),
                });
            }
            (SwapState::OnBackup(start), false, true) => {
                self.swaps.push(RecorderSwap {
                    to_backup: Some(start),
                    to_prime: Some(sample.time),
                });
                self.state = SwapState::Idle;
            }
            _ => {}
        }
    }

    /// Finishes the stream, reporting a swap still in progress.
    #[must_use]
    pub fn finish(mut self) -> Vec<RecorderSwap> {
        if let SwapState::OnBackup(start) = self.state {
            self.swaps.push(RecorderSwap {
                to_backup: Some(start),
                to_prime: None,
            });
        }
        self.swaps
    }
}

/// Detects all swaps in a chronologically ordered sample sequence.
#[must_use]
pub fn detect_swaps<I>(samples: I) -> Vec<RecorderSwap>
where
    I: IntoIterator<Item = EnableSample>,
{
    let mut detector = SwapDetector::new();
    for sample in samples {
        detector.push(sample);
    }
    let swaps = detector.finish();
    log::debug!("detected {} recorder swap(s)", swaps.len());
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[bool]) -> Vec<EnableSample> {
        let t0 = MissionTime::from_yday("2024:001:00:00:00").unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &enabled)| EnableSample {
                time: t0.offset_secs(60.0 * i as f64),
                enabled,
            })
            .collect()
    }

    fn at(minute: u32) -> MissionTime {
        MissionTime::from_yday("2024:001:00:00:00")
            .unwrap()
            .offset_secs(60.0 * f64::from(minute))
    }

    #[test]
    fn test_no_transitions() {
        assert!(detect_swaps(samples(&[true, true, true])).is_empty());
        assert!(detect_swaps(Vec::new()).is_empty());
    }

    #[test]
    fn test_complete_swap() {
        let swaps = detect_swaps(samples(&[true, false, false, true]));
        assert_eq!(
            swaps,
            vec![RecorderSwap {
                to_backup: Some(at(1)),
                to_prime: Some(at(3)),
            }]
        );
    }

    #[test]
    fn test_open_swap() {
        let swaps = detect_swaps(samples(&[true, true, false, false]));
        assert_eq!(
            swaps,
            vec![RecorderSwap {
                to_backup: Some(at(2)),
                to_prime: None,
            }]
        );
    }

    #[test]
    fn test_recovery_only() {
        let swaps = detect_swaps(samples(&[false, true, true, false, true]));
        assert_eq!(
            swaps,
            vec![
                RecorderSwap {
                    to_backup: None,
                    to_prime: Some(at(1)),
                },
                RecorderSwap {
                    to_backup: Some(at(3)),
                    to_prime: Some(at(4)),
                },
            ]
        );
    }
}
