//! Mission time: UTC instants in the Chandra `yday` and MAUDE text forms.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A UTC instant with nanosecond resolution.
///
/// Text forms:
/// - `yday`: `YYYY:DDD:HH:MM:SS.sss` (trailing fields optional)
/// - MAUDE compact: `YYYYDDDHHMMSS` followed by optional fractional digits,
///   with an optional `.` after the day of year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct MissionTime(DateTime<Utc>);

impl MissionTime {
    /// Wraps a chrono UTC timestamp.
    #[inline]
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying chrono timestamp.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parses a `yday` string such as `2024:001:12:30:00.250`.
    pub fn from_yday(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidTime(text.to_string());
        let fields: Vec<&str> = text.trim().split(':').collect();
        if fields.len() < 2 || fields.len() > 5 {
            return Err(invalid());
        }

        let year: i32 = parse_field(fields[0], 4).ok_or_else(invalid)?;
        let doy: u32 = parse_field(fields[1], 3).ok_or_else(invalid)?;
        let hour: u32 = match fields.get(2) {
            Some(f) => parse_field(f, 2).ok_or_else(invalid)?,
            None => 0,
        };
        let minute: u32 = match fields.get(3) {
            Some(f) => parse_field(f, 2).ok_or_else(invalid)?,
            None => 0,
        };
        let seconds = match fields.get(4) {
            Some(f) => parse_seconds(f).ok_or_else(invalid)?,
            None => 0.0,
        };

        Self::from_parts(year, doy, hour, minute, seconds).ok_or_else(invalid)
    }

    /// Parses a MAUDE compact timestamp such as `2024001123000250`.
    pub fn from_maude(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidTime(text.to_string());
        let trimmed = text.trim();
        let compact: String = if trimmed.len() > 7 && trimmed.as_bytes()[7] == b'.' {
            format!("{}{}", &trimmed[..7], &trimmed[8..])
        } else {
            trimmed.to_string()
        };
        if compact.len() < 13 || !compact.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = compact[0..4].parse().map_err(|_| invalid())?;
        let doy: u32 = compact[4..7].parse().map_err(|_| invalid())?;
        let hour: u32 = compact[7..9].parse().map_err(|_| invalid())?;
        let minute: u32 = compact[9..11].parse().map_err(|_| invalid())?;
        let whole: u32 = compact[11..13].parse().map_err(|_| invalid())?;
        let fraction = &compact[13..];
        let seconds = if fraction.is_empty() {
            f64::from(whole)
        } else {
            format!("{whole}.{fraction}").parse().map_err(|_| invalid())?
        };

        Self::from_parts(year, doy, hour, minute, seconds).ok_or_else(invalid)
    }

    fn from_parts(year: i32, doy: u32, hour: u32, minute: u32, seconds: f64) -> Option<Self> {
        if !(0.0..61.0).contains(&seconds) {
            return None;
        }
        let naive = NaiveDate::from_yo_opt(year, doy)?.and_hms_opt(hour, minute, 0)?;
        let base = Utc.from_utc_datetime(&naive);
        Some(Self(base + Duration::nanoseconds((seconds * 1e9).round() as i64)))
    }

    /// Formats as `yday` with millisecond precision.
    #[must_use]
    pub fn yday(&self) -> String {
        self.0.format("%Y:%j:%H:%M:%S%.3f").to_string()
    }

    /// Signed seconds from `earlier` to `self` (negative if `self` is earlier).
    #[must_use]
    pub fn seconds_since(&self, earlier: &Self) -> f64 {
        let delta = self.0.signed_duration_since(earlier.0);
        match delta.num_nanoseconds() {
            Some(ns) => ns as f64 / 1e9,
            None => delta.num_milliseconds() as f64 / 1e3,
        }
    }

    /// Signed whole nanoseconds from `earlier` to `self`.
    #[must_use]
    pub fn nanos_since(&self, earlier: &Self) -> i128 {
        let delta = self.0.signed_duration_since(earlier.0);
        i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
    }

    /// Shifts the instant by a signed number of seconds.
    #[must_use]
    pub fn offset_secs(&self, seconds: f64) -> Self {
        Self(self.0 + Duration::nanoseconds((seconds * 1e9).round() as i64))
    }

    /// Instant halfway between `a` and `b`.
    #[must_use]
    pub fn midpoint(a: &Self, b: &Self) -> Self {
        a.offset_secs(b.seconds_since(a) / 2.0)
    }
}

fn parse_field<T: FromStr>(field: &str, width: usize) -> Option<T> {
    if field.is_empty() || field.len() > width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_seconds(field: &str) -> Option<f64> {
    let (whole, fraction) = field.split_once('.').unwrap_or((field, ""));
    if whole.is_empty() || whole.len() > 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl fmt::Display for MissionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.yday())
    }
}

impl FromStr for MissionTime {
    type Err = Error;

    /// Accepts either `yday` or MAUDE compact text.
    fn from_str(s: &str) -> Result<Self> {
        if s.contains(':') {
            Self::from_yday(s)
        } else {
            Self::from_maude(s)
        }
    }
}

impl TryFrom<String> for MissionTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MissionTime> for String {
    fn from(value: MissionTime) -> Self {
        value.yday()
    }
}

impl From<DateTime<Utc>> for MissionTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}
