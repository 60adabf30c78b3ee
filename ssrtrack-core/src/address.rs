//! Circular recorder address space and wraparound arithmetic.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]

use std::fmt;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chandra SSR capacity in 16-bit words.
pub const CHANDRA_SSR_MODULUS: u64 = 134_217_696;

/// Nominal SSR record rate in words per second (32 kbps).
pub const CHANDRA_RECORD_RATE: f64 = 2000.0;

const NANOS_PER_SEC: i128 = 1_000_000_000;

// Integral rates up to this use exact integer arithmetic in `words_in_nanos`.
const MAX_EXACT_RATE: f64 = 1e15;

/// A word address inside a recorder address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address without range checking.
    #[inline]
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw word address.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Address> for u64 {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Fixed-capacity circular buffer advancing clockwise at a nominal rate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AddressSpace {
    modulus: u64,
    nominal_rate: f64,
}

impl AddressSpace {
    /// Creates an address space, rejecting non-positive modulus or rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `modulus <= 0`, the rate is not a
    /// positive finite number, or one lap of the buffer takes longer than a
    /// signed 64-bit nanosecond count can hold.
    pub fn new(modulus: i64, nominal_rate: f64) -> Result<Self> {
        if modulus <= 0 {
            return Err(Error::ConfigError(format!(
                "address space modulus must be positive, got {modulus}"
            )));
        }
        if !nominal_rate.is_finite() || nominal_rate <= 0.0 {
            return Err(Error::ConfigError(format!(
                "nominal rate must be a positive number of addresses per second, got {nominal_rate}"
            )));
        }
        let lap_nanos = modulus as f64 / nominal_rate * 1e9;
        if lap_nanos >= i64::MAX as f64 {
            return Err(Error::ConfigError(format!(
                "nominal rate {nominal_rate} is too slow for a {modulus}-address lap"
            )));
        }
        Ok(Self {
            modulus: modulus.unsigned_abs(),
            nominal_rate,
        })
    }

    /// Chandra SSR defaults: 134,217,696 words recorded at 2000 words/s.
    #[must_use]
    pub fn chandra_defaults() -> Self {
        Self {
            modulus: CHANDRA_SSR_MODULUS,
            nominal_rate: CHANDRA_RECORD_RATE,
        }
    }

    /// Same buffer, different advance rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a non-positive rate.
    pub fn with_rate(&self, nominal_rate: f64) -> Result<Self> {
        Self::new(self.modulus as i64, nominal_rate)
    }

    /// Number of addresses in the buffer.
    #[inline]
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Advance rate in addresses per second.
    #[inline]
    #[must_use]
    pub fn nominal_rate(&self) -> f64 {
        self.nominal_rate
    }

    /// Reduces any integer into `[0, modulus)` using floored modulo.
    #[inline]
    #[must_use]
    pub fn wrap(&self, raw: i64) -> Address {
        self.wrap_wide(i128::from(raw))
    }

    /// [`Self::wrap`] for unwrapped positions beyond the `i64` range.
    #[inline]
    #[must_use]
    pub fn wrap_wide(&self, raw: i128) -> Address {
        let wrapped = raw.rem_euclid(i128::from(self.modulus));
        // rem_euclid result is in [0, modulus) which always fits u64
        Address(u64::try_from(wrapped).unwrap_or_default())
    }

    /// Validates a raw telemetry value as an address in this space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressOutOfRange`] if `raw` is negative or not below the modulus.
    pub fn address(&self, raw: i64) -> Result<Address> {
        match u64::try_from(raw) {
            Ok(value) if value < self.modulus => Ok(Address(value)),
            _ => Err(Error::AddressOutOfRange {
                address: raw,
                modulus: self.modulus,
            }),
        }
    }

    /// Returns true if `address` lies inside the buffer.
    #[inline]
    #[must_use]
    pub fn contains(&self, address: Address) -> bool {
        address.0 < self.modulus
    }

    /// Clockwise distance from `from` to `to`; never negative, zero when equal.
    #[inline]
    #[must_use]
    pub fn forward_distance(&self, from: Address, to: Address) -> u64 {
        let from = from.0 % self.modulus;
        let to = to.0 % self.modulus;
        if to >= from {
            to - from
        } else {
            self.modulus - from + to
        }
    }

    /// Seconds needed to advance `distance` addresses at the nominal rate.
    #[inline]
    #[must_use]
    pub fn seconds_for(&self, distance: u64) -> f64 {
        distance as f64 / self.nominal_rate
    }

    /// Addresses covered in `seconds` at the nominal rate (signed, unwrapped).
    #[inline]
    #[must_use]
    pub fn words_for(&self, seconds: f64) -> f64 {
        seconds * self.nominal_rate
    }

    /// Whole addresses covered in `elapsed_ns` nanoseconds, floored toward
    /// negative infinity.
    ///
    /// Integral rates are computed exactly, so a pointer step that lands on
    /// a whole nanosecond never comes back one word short.
    #[must_use]
    pub fn words_in_nanos(&self, elapsed_ns: i128) -> i128 {
        let rate = self.nominal_rate;
        if rate.fract() == 0.0 && rate < MAX_EXACT_RATE {
            (elapsed_ns * rate as i128).div_euclid(NANOS_PER_SEC)
        } else {
            (elapsed_ns as f64 * rate / 1e9).floor() as i128
        }
    }

    /// Clockwise polar angle of an address, in degrees `[0, 360)`.
    #[must_use]
    pub fn angle_degrees(&self, address: Address) -> f64 {
        360.0 * (address.0 % self.modulus) as f64 / self.modulus as f64
    }

    /// Start and end angles of the clockwise arc from `from` to `to`.
    ///
    /// The end angle is unwrapped past 360 when the arc crosses address zero,
    /// so `end >= start` always holds.
    #[must_use]
    pub fn arc_degrees(&self, from: Address, to: Address) -> (f64, f64) {
        let start = self.angle_degrees(from);
        let span = 360.0 * self.forward_distance(from, to) as f64 / self.modulus as f64;
        (start, start + span)
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::chandra_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            AddressSpace::new(0, 2000.0),
            Err(Error::ConfigError(_))
        ));
        assert!(AddressSpace::new(-5, 2000.0).is_err());
        assert!(AddressSpace::new(100, 0.0).is_err());
        assert!(AddressSpace::new(100, -1.0).is_err());
        assert!(AddressSpace::new(100, f64::NAN).is_err());
        assert!(AddressSpace::new(100, 1.0).is_ok());
    }

    #[test]
    fn test_rejects_rate_too_slow_for_time_range() {
        assert!(matches!(
            AddressSpace::new(134_217_696, 1e-9),
            Err(Error::ConfigError(_))
        ));
        // One lap of ~1.4 years still fits
        assert!(AddressSpace::new(134_217_696, 3.0).is_ok());
    }

    #[test]
    fn test_words_in_nanos_exact_and_floored() {
        let space = AddressSpace::chandra_defaults();
        // 523,834 words at 500 us each
        assert_eq!(space.words_in_nanos(523_834 * 500_000), 523_834);
        assert_eq!(space.words_in_nanos(499_999), 0);
        assert_eq!(space.words_in_nanos(-1), -1);
        assert_eq!(space.words_in_nanos(-500_000), -1);

        let odd = AddressSpace::new(1000, 2.5).unwrap();
        assert_eq!(odd.words_in_nanos(1_000_000_000), 2);
    }

    #[test]
    fn test_wrap_negative_and_large() {
        let space = AddressSpace::chandra_defaults();
        assert_eq!(space.wrap(-59_000), Address(134_158_696));
        assert_eq!(space.wrap(134_217_696), Address(0));
        assert_eq!(space.wrap(134_217_697), Address(1));
        assert!(space.wrap(i64::MIN).0 < space.modulus());
        assert!(space.wrap(i64::MAX).0 < space.modulus());
    }

    #[test]
    fn test_forward_distance_across_zero() {
        let space = AddressSpace::new(100, 1.0).unwrap();
        assert_eq!(space.forward_distance(Address(10), Address(30)), 20);
        assert_eq!(space.forward_distance(Address(90), Address(10)), 20);
        assert_eq!(space.forward_distance(Address(42), Address(42)), 0);
        assert_eq!(space.forward_distance(Address(30), Address(10)), 80);
    }

    #[test]
    fn test_address_validation() {
        let space = AddressSpace::new(100, 1.0).unwrap();
        assert_eq!(space.address(99).unwrap(), Address(99));
        assert!(matches!(
            space.address(100),
            Err(Error::AddressOutOfRange { address: 100, .. })
        ));
        assert!(space.address(-1).is_err());
        assert!(space.contains(Address(0)));
        assert!(!space.contains(Address(100)));
    }

    #[test]
    fn test_rate_conversions() {
        let space = AddressSpace::chandra_defaults();
        assert_abs_diff_eq!(space.seconds_for(120_000), 60.0);
        assert_abs_diff_eq!(space.words_for(-30.0), -60_000.0);
        let fast = space.with_rate(4000.0).unwrap();
        assert_abs_diff_eq!(fast.seconds_for(120_000), 30.0);
        assert_eq!(fast.modulus(), space.modulus());
    }

    #[test]
    fn test_polar_geometry() {
        let space = AddressSpace::new(360, 1.0).unwrap();
        assert_abs_diff_eq!(space.angle_degrees(Address(90)), 90.0);

        let (start, end) = space.arc_degrees(Address(350), Address(10));
        assert_abs_diff_eq!(start, 350.0);
        assert_abs_diff_eq!(end, 370.0);

        let (start, end) = space.arc_degrees(Address(10), Address(40));
        assert_abs_diff_eq!(start, 10.0);
        assert_abs_diff_eq!(end, 40.0);
    }
}
