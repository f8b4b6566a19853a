// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Validated server configuration.
//!
//! The configuration is a JSON document loaded once at startup and immutable
//! for the process lifetime. [`Config::load`] reads, parses, and validates in
//! one step; validation accumulates every violated rule into a single
//! [`ConfigError::Invalid`] so a bad file is fixed in one pass.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::clock::DriftModel;
use crate::error::{ConfigError, ConfigViolation};
use crate::protocol::{LeapIndicator, MAXSTRAT, Version};

fn default_ref_id() -> String {
    "LOCL".to_string()
}

fn default_version_number() -> u8 {
    4
}

fn default_drift_update_interval() -> u64 {
    60
}

fn default_state_file() -> PathBuf {
    PathBuf::from("mimic-ntpd-state.json")
}

/// Which drift model the simulated clock runs.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DriftModelKind {
    /// The simulated clock advances at the true wall-clock rate.
    #[default]
    None,
    /// The drift coefficient takes a bounded random step at a fixed interval.
    RandomWalk,
}

/// Top-level configuration for the simulated NTP server.
///
/// Field names match the JSON document keys. Ranges are inclusive on both
/// ends; `drift_ppm` is the starting drift coefficient for the `random_walk`
/// model (a step bound of zero yields a constant deterministic drift).
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// UDP port to listen on.
    pub port: u16,
    /// Emit per-request debug output.
    #[serde(default)]
    pub debug: bool,
    /// Minimum poll exponent stamped into responses.
    pub min_poll: i8,
    /// Maximum poll exponent stamped into responses.
    pub max_poll: i8,
    /// Minimum precision exponent stamped into responses.
    pub min_precision: i8,
    /// Maximum precision exponent stamped into responses.
    pub max_precision: i8,
    /// Minimum stratum stamped into responses.
    pub min_stratum: u8,
    /// Maximum stratum stamped into responses.
    pub max_stratum: u8,
    /// Seconds the reference timestamp lags the simulated clock.
    #[serde(default)]
    pub max_ref_time_offset: u64,
    /// ASCII reference identifier tag (1-4 characters, NUL-padded on the wire).
    #[serde(default = "default_ref_id")]
    pub ref_id: String,
    /// Leap indicator stamped into responses (0-3).
    #[serde(default)]
    pub leap_indicator: u8,
    /// NTP version number stamped into responses (1-7).
    #[serde(default = "default_version_number")]
    pub version_number: u8,
    /// Bound on the uniform jitter applied to receive/transmit timestamps, in
    /// milliseconds.
    #[serde(default)]
    pub jitter_ms: u32,
    /// Fixed processing delay subtracted from the receive timestamp, in
    /// milliseconds.
    #[serde(default)]
    pub processing_delay_ms: u32,
    /// Drift model for the simulated clock.
    #[serde(default)]
    pub drift_model: DriftModelKind,
    /// Starting drift coefficient in parts per million.
    #[serde(default)]
    pub drift_ppm: f64,
    /// Bound on each random-walk step, in parts per million.
    #[serde(default)]
    pub drift_step_ppm: f64,
    /// Seconds between random-walk drift updates.
    #[serde(default = "default_drift_update_interval")]
    pub drift_update_interval_sec: u64,
    /// Persist session state on shutdown and resume it on startup.
    #[serde(default)]
    pub persist_state: bool,
    /// Path of the persisted session state file.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl Config {
    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every configuration rule, accumulating all violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();

        if self.leap_indicator > 3 {
            violations.push(ConfigViolation::LeapIndicatorOutOfRange {
                value: self.leap_indicator,
            });
        }
        if !(1..=7).contains(&self.version_number) {
            violations.push(ConfigViolation::VersionOutOfRange {
                value: self.version_number,
            });
        }
        if self.min_stratum > self.max_stratum || self.max_stratum > MAXSTRAT {
            violations.push(ConfigViolation::StratumRangeInvalid {
                min: self.min_stratum,
                max: self.max_stratum,
            });
        }
        if self.min_poll > self.max_poll {
            violations.push(ConfigViolation::PollRangeInvalid {
                min: self.min_poll,
                max: self.max_poll,
            });
        }
        if self.min_precision > self.max_precision {
            violations.push(ConfigViolation::PrecisionRangeInvalid {
                min: self.min_precision,
                max: self.max_precision,
            });
        }
        if self.ref_id.is_empty() || self.ref_id.len() > 4 || !self.ref_id.is_ascii() {
            violations.push(ConfigViolation::RefIdInvalid {
                value: self.ref_id.clone(),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { violations })
        }
    }

    /// The configured leap indicator as a typed value.
    pub fn leap_indicator(&self) -> LeapIndicator {
        LeapIndicator::from_bits(self.leap_indicator)
    }

    /// The configured version number as a typed value.
    pub fn version(&self) -> Version {
        Version::new(self.version_number).unwrap_or_default()
    }

    /// The reference identifier tag, NUL-padded to 4 bytes.
    pub fn ref_id_bytes(&self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        for (dst, src) in bytes.iter_mut().zip(self.ref_id.bytes().take(4)) {
            *dst = src;
        }
        bytes
    }

    /// The drift model with its parameters, as the clock consumes it.
    pub fn drift_model(&self) -> DriftModel {
        match self.drift_model {
            DriftModelKind::None => DriftModel::None,
            DriftModelKind::RandomWalk => DriftModel::RandomWalk {
                step_ppm: self.drift_step_ppm,
                update_interval: Duration::from_secs(self.drift_update_interval_sec),
            },
        }
    }
}

/// A baseline valid configuration for unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        debug: false,
        min_poll: 4,
        max_poll: 10,
        min_precision: -24,
        max_precision: -16,
        min_stratum: 1,
        max_stratum: 3,
        max_ref_time_offset: 30,
        ref_id: "GPS".to_string(),
        leap_indicator: 0,
        version_number: 4,
        jitter_ms: 5,
        processing_delay_ms: 2,
        drift_model: DriftModelKind::None,
        drift_ppm: 0.0,
        drift_step_ppm: 0.0,
        drift_update_interval_sec: 60,
        persist_state: false,
        state_file: default_state_file(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        test_config()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_leap_indicator_out_of_range() {
        let mut cfg = base_config();
        cfg.leap_indicator = 4;
        let err = cfg.validate().unwrap_err();
        match err {
            ConfigError::Invalid { violations } => {
                assert_eq!(
                    violations,
                    vec![ConfigViolation::LeapIndicatorOutOfRange { value: 4 }]
                );
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_version_zero_rejected() {
        let mut cfg = base_config();
        cfg.version_number = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_stratum_above_sixteen_rejected() {
        let mut cfg = base_config();
        cfg.max_stratum = 17;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let mut cfg = base_config();
        cfg.min_poll = 10;
        cfg.max_poll = 4;
        cfg.min_precision = -10;
        cfg.max_precision = -20;
        cfg.min_stratum = 3;
        cfg.max_stratum = 1;
        let err = cfg.validate().unwrap_err();
        match err {
            ConfigError::Invalid { violations } => assert_eq!(violations.len(), 3),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_all_violations_accumulate() {
        let mut cfg = base_config();
        cfg.leap_indicator = 7;
        cfg.version_number = 9;
        cfg.min_poll = 1;
        cfg.max_poll = 0;
        cfg.ref_id = String::new();
        let err = cfg.validate().unwrap_err();
        match err {
            ConfigError::Invalid { violations } => assert_eq!(violations.len(), 4),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_ref_id_too_long_rejected() {
        let mut cfg = base_config();
        cfg.ref_id = "GPSXX".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ref_id_bytes_padded() {
        let mut cfg = base_config();
        cfg.ref_id = "GPS".to_string();
        assert_eq!(cfg.ref_id_bytes(), *b"GPS\0");
        cfg.ref_id = "LOCL".to_string();
        assert_eq!(cfg.ref_id_bytes(), *b"LOCL");
    }

    #[test]
    fn test_typed_accessors() {
        let mut cfg = base_config();
        cfg.leap_indicator = 3;
        cfg.version_number = 3;
        assert_eq!(cfg.leap_indicator(), LeapIndicator::Unknown);
        assert_eq!(cfg.version(), Version::V3);
    }

    #[test]
    fn test_drift_model_conversion() {
        let mut cfg = base_config();
        assert_eq!(cfg.drift_model(), DriftModel::None);

        cfg.drift_model = DriftModelKind::RandomWalk;
        cfg.drift_step_ppm = 0.5;
        cfg.drift_update_interval_sec = 10;
        assert_eq!(
            cfg.drift_model(),
            DriftModel::RandomWalk {
                step_ppm: 0.5,
                update_interval: Duration::from_secs(10),
            }
        );
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "port": 1123,
            "min_poll": 4,
            "max_poll": 10,
            "min_precision": -24,
            "max_precision": -16,
            "min_stratum": 1,
            "max_stratum": 3
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.ref_id, "LOCL");
        assert_eq!(cfg.version_number, 4);
        assert_eq!(cfg.drift_model, DriftModelKind::None);
        assert_eq!(cfg.drift_update_interval_sec, 60);
        assert_eq!(cfg.state_file, PathBuf::from("mimic-ntpd-state.json"));
        assert!(!cfg.persist_state);
    }

    #[test]
    fn test_drift_model_from_json_tag() {
        let json = r#"{
            "port": 1123,
            "min_poll": 4,
            "max_poll": 10,
            "min_precision": -24,
            "max_precision": -16,
            "min_stratum": 1,
            "max_stratum": 3,
            "drift_model": "random_walk",
            "drift_ppm": 12.0,
            "drift_step_ppm": 0.25
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.drift_model, DriftModelKind::RandomWalk);
        assert_eq!(cfg.drift_ppm, 12.0);
    }
}
