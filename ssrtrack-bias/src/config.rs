//! Tracker configuration: recorder geometry plus bias policy.
//!
//! Loaded from JSON; every field is optional and falls back to the Chandra
//! SSR values.
//!
//! ```json
//! {
//!   "recorder": { "modulus": 134217696, "record_rate": 2000.0 },
//!   "policy": { "long_threshold_secs": 1440.0, "stale_horizon_secs": 64800.0 }
//! }
//! ```
#![allow(clippy::cast_possible_wrap)]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use ssrtrack_core::{AddressSpace, CHANDRA_RECORD_RATE, CHANDRA_SSR_MODULUS};

use crate::error::Result;
use crate::policy::ConcernPolicy;

/// Complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerConfig {
    /// Recorder address space and record rate.
    pub space: AddressSpace,
    /// Classification and window policy.
    pub policy: ConcernPolicy,
}

#[derive(Deserialize)]
struct JsonConfig {
    #[serde(default)]
    recorder: JsonRecorder,
    #[serde(default)]
    policy: ConcernPolicy,
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonRecorder {
    modulus: i64,
    record_rate: f64,
}

impl Default for JsonRecorder {
    fn default() -> Self {
        Self {
            modulus: CHANDRA_SSR_MODULUS as i64,
            record_rate: CHANDRA_RECORD_RATE,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the file cannot be read or parsed, or
    /// a configuration error if a value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json_config: JsonConfig = serde_json::from_reader(reader)?;
        Self::from_json_config(json_config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if parsing fails, or a configuration error if a
    /// value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let json_config: JsonConfig = serde_json::from_str(json)?;
        Self::from_json_config(json_config)
    }

    fn from_json_config(config: JsonConfig) -> Result<Self> {
        let space = AddressSpace::new(config.recorder.modulus, config.recorder.record_rate)?;
        let config = Self {
            space,
            policy: config.policy,
        };
        config.validate()?;
        log::debug!(
            "loaded tracker config: modulus {}, rate {} words/s",
            config.space.modulus(),
            config.space.nominal_rate()
        );
        Ok(config)
    }

    /// Validates the policy. The address space validates itself on construction.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = TrackerConfig::from_json("{}").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.space.modulus(), 134_217_696);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "recorder": { "record_rate": 4000.0 },
            "policy": { "long_threshold_secs": 1800.0 }
        }"#;
        let config = TrackerConfig::from_json(json).unwrap();
        assert_eq!(config.space.modulus(), CHANDRA_SSR_MODULUS);
        assert_relative_eq!(config.space.nominal_rate(), 4000.0);
        assert_relative_eq!(config.policy.long_threshold_secs, 1800.0);
        assert_eq!(config.policy.short_prefix, "TE");
        assert_eq!(config.policy.short_windows.len(), 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = TrackerConfig::from_json(r#"{"recorder": {"modulus": 0}}"#);
        assert!(matches!(result, Err(Error::CoreError(_))));

        let result = TrackerConfig::from_json(r#"{"policy": {"stale_horizon_secs": -1.0}}"#);
        assert!(matches!(result, Err(Error::ConfigError(_))));

        let result = TrackerConfig::from_json("not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"recorder": {{"modulus": 1000, "record_rate": 10.0}}}}"#).unwrap();
        let config = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.space.modulus(), 1000);

        let missing = TrackerConfig::from_file("/nonexistent/ssrtrack.json");
        assert!(matches!(missing, Err(Error::IoError(_))));
    }
}
