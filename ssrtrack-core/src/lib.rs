//! ssrtrack-core: Solid state recorder pointer/time correlation.
//!
//! This crate provides the circular address space of a spacecraft recorder,
//! the mission time type, and the correlator that maps between recorder
//! addresses and spacecraft time from a single reference sample.
//!

pub mod address;
pub mod codeword;
pub mod correlator;
pub mod error;
pub mod playback;
pub mod swap;
pub mod time;

pub use address::{Address, AddressSpace, CHANDRA_RECORD_RATE, CHANDRA_SSR_MODULUS};
pub use codeword::{detect_bad_codewords, BadCodeword, CodewordDetector, CodewordSample};
pub use correlator::{Direction, PointerCorrelator, ReferenceSample};
pub use error::{Error, Result};
pub use playback::{
    current_and_previous, downlink_bits_per_second, last_playback_time, select_last_playback,
    PlaybackState, RecorderId,
};
pub use swap::{detect_swaps, EnableSample, RecorderSwap, SwapDetector};
pub use time::MissionTime;
