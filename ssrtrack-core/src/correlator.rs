//! Pointer/time correlation anchored to a single reference sample.
//!
//! The recorder pointer advances clockwise at the nominal rate, so one
//! `(time, address)` observation is enough to predict where the pointer was
//! (or will be) at any other time. The reverse mapping is ambiguous: an
//! address is revisited once per trip around the buffer, and whether the
//! target was written before or after the reference has to come from the
//! caller as a [`Direction`].
#![allow(clippy::cast_possible_wrap)]

use std::fmt;
use std::str::FromStr;

use crate::address::{Address, AddressSpace};
use crate::error::{Error, Result};
use crate::time::MissionTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The recorder pointer was at `address` at `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceSample {
    /// Time of the pointer telemetry sample.
    pub timestamp: MissionTime,
    /// Pointer value at that time.
    pub address: Address,
}

impl ReferenceSample {
    /// Creates a reference sample after checking the address against `space`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressOutOfRange`] if the address is not inside `space`.
    pub fn new(timestamp: MissionTime, address: u64, space: &AddressSpace) -> Result<Self> {
        let address = Address(address);
        if !space.contains(address) {
            return Err(Error::AddressOutOfRange {
                address: address.0 as i64,
                modulus: space.modulus(),
            });
        }
        Ok(Self { timestamp, address })
    }

    /// Seconds elapsed between the sample and `now`.
    #[must_use]
    pub fn age_secs(&self, now: &MissionTime) -> f64 {
        now.seconds_since(&self.timestamp)
    }

    /// True once the sample is older than `max_age_secs` at `now`.
    #[must_use]
    pub fn is_stale(&self, now: &MissionTime, max_age_secs: f64) -> bool {
        self.age_secs(now) > max_age_secs
    }
}

/// Whether a target address was written after or before the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Target is reached by advancing from the reference (later in time).
    Forward,
    /// Target was passed before the reference (earlier in time).
    Backward,
}

impl Direction {
    /// Interprets a signed hint: positive is forward, negative is backward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousDirection`] for zero.
    pub fn from_sign(sign: i32) -> Result<Self> {
        match sign.signum() {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Backward),
            _ => Err(Error::AmbiguousDirection(sign.to_string())),
        }
    }

    /// `+1.0` for forward, `-1.0` for backward.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Backward => f.write_str("backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "after" | "+1" | "1" => Ok(Self::Forward),
            "backward" | "before" | "-1" => Ok(Self::Backward),
            other => Err(Error::AmbiguousDirection(format!("{other:?}"))),
        }
    }
}

/// Bidirectional time/address mapping for one recorder pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerCorrelator {
    space: AddressSpace,
    reference: ReferenceSample,
}

impl PointerCorrelator {
    /// Anchors a correlator to `reference` in `space`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressOutOfRange`] if the reference address is outside `space`.
    pub fn new(space: AddressSpace, reference: ReferenceSample) -> Result<Self> {
        if !space.contains(reference.address) {
            return Err(Error::AddressOutOfRange {
                address: reference.address.0 as i64,
                modulus: space.modulus(),
            });
        }
        Ok(Self { space, reference })
    }

    /// The address space this correlator works in.
    #[inline]
    #[must_use]
    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// The anchoring reference sample.
    #[inline]
    #[must_use]
    pub fn reference(&self) -> &ReferenceSample {
        &self.reference
    }

    /// Replaces the reference with a fresher sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressOutOfRange`] if the new address is outside the space.
    pub fn refresh(&mut self, reference: ReferenceSample) -> Result<()> {
        *self = Self::new(self.space, reference)?;
        Ok(())
    }

    /// Expected pointer address at `target`, before or after the reference.
    #[must_use]
    pub fn address_at_time(&self, target: &MissionTime) -> Address {
        if *target == self.reference.timestamp {
            return self.reference.address;
        }
        let elapsed_ns = target.nanos_since(&self.reference.timestamp);
        let unwrapped =
            i128::from(self.reference.address.0) + self.space.words_in_nanos(elapsed_ns);
        self.space.wrap_wide(unwrapped)
    }

    /// Time at which the pointer was (or will be) at `target`.
    ///
    /// [`Direction::Forward`] measures the clockwise distance from the
    /// reference to the target and adds it; [`Direction::Backward`] measures
    /// the clockwise distance from the target up to the reference and
    /// subtracts it.
    #[must_use]
    pub fn time_at_address(&self, target: Address, direction: Direction) -> MissionTime {
        let distance = match direction {
            Direction::Forward => self.space.forward_distance(self.reference.address, target),
            Direction::Backward => self.space.forward_distance(target, self.reference.address),
        };
        let seconds = self.space.seconds_for(distance);
        self.reference
            .timestamp
            .offset_secs(direction.sign() * seconds)
    }

    /// [`Self::time_at_address`] for callers holding an optional hint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousDirection`] when no hint is given.
    pub fn time_at_address_hinted(
        &self,
        target: Address,
        direction: Option<Direction>,
    ) -> Result<MissionTime> {
        let direction = direction.ok_or_else(|| Error::AmbiguousDirection("no hint".into()))?;
        Ok(self.time_at_address(target, direction))
    }
}
