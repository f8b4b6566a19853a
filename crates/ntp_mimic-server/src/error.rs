// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for the simulated NTP server.
//!
//! Configuration problems are fatal and reported before the socket is
//! opened; [`ConfigError::Invalid`] carries *every* violated rule so an
//! operator fixes a bad file in one pass instead of replaying
//! first-failure-wins errors. State-file problems are split into
//! [`StateError::NotFound`] and [`StateError::Corrupt`] because the caller
//! treats them differently: both fall back to a fresh session, but a corrupt
//! file is worth a louder log line.

// Re-export the proto parse error for downstream convenience.
pub use mimic_proto::error::ParseError;

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while running the simulated NTP server.
#[derive(Debug)]
pub enum MimicServerError {
    /// Invalid or unreadable configuration.
    Config(ConfigError),
    /// Session state persistence failure.
    State(StateError),
    /// Underlying I/O error (socket bind, send/recv, etc.).
    Io(io::Error),
}

/// A single violated configuration rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigViolation {
    /// Leap indicator outside 0-3.
    LeapIndicatorOutOfRange {
        /// The configured value.
        value: u8,
    },
    /// Version number outside 1-7.
    VersionOutOfRange {
        /// The configured value.
        value: u8,
    },
    /// Stratum range empty or outside 0-16.
    StratumRangeInvalid {
        /// Configured minimum stratum.
        min: u8,
        /// Configured maximum stratum.
        max: u8,
    },
    /// Poll exponent range empty (min > max).
    PollRangeInvalid {
        /// Configured minimum poll exponent.
        min: i8,
        /// Configured maximum poll exponent.
        max: i8,
    },
    /// Precision exponent range empty (min > max).
    PrecisionRangeInvalid {
        /// Configured minimum precision exponent.
        min: i8,
        /// Configured maximum precision exponent.
        max: i8,
    },
    /// Reference identifier not 1-4 ASCII characters.
    RefIdInvalid {
        /// The configured identifier.
        value: String,
    },
}

/// Errors produced while loading or validating the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The configuration file is not valid JSON for the expected shape.
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
    /// One or more configuration rules are violated.
    Invalid {
        /// Every violated rule, in field order.
        violations: Vec<ConfigViolation>,
    },
}

/// Errors produced while loading or saving persisted session state.
#[derive(Debug)]
pub enum StateError {
    /// No state file exists at the given path.
    NotFound {
        /// Path of the missing file.
        path: PathBuf,
    },
    /// The state file exists but could not be parsed.
    Corrupt {
        /// Path of the file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
    /// Reading or writing the state file failed.
    Io {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

// ── Display implementations ─────────────────────────────────────────

impl fmt::Display for MimicServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimicServerError::Config(e) => write!(f, "configuration error: {e}"),
            MimicServerError::State(e) => write!(f, "session state error: {e}"),
            MimicServerError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigViolation::LeapIndicatorOutOfRange { value } => {
                write!(f, "leap_indicator {} out of range 0-3", value)
            }
            ConfigViolation::VersionOutOfRange { value } => {
                write!(f, "version_number {} out of range 1-7", value)
            }
            ConfigViolation::StratumRangeInvalid { min, max } => {
                write!(
                    f,
                    "stratum range {}-{} invalid (must satisfy 0 <= min <= max <= 16)",
                    min, max
                )
            }
            ConfigViolation::PollRangeInvalid { min, max } => {
                write!(f, "poll range {}-{} invalid (min > max)", min, max)
            }
            ConfigViolation::PrecisionRangeInvalid { min, max } => {
                write!(f, "precision range {}-{} invalid (min > max)", min, max)
            }
            ConfigViolation::RefIdInvalid { value } => {
                write!(f, "ref_id {:?} must be 1-4 ASCII characters", value)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
            ConfigError::Invalid { violations } => {
                write!(f, "invalid configuration: ")?;
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::NotFound { path } => {
                write!(f, "no state file at {}", path.display())
            }
            StateError::Corrupt { path, source } => {
                write!(f, "state file {} is corrupt: {}", path.display(), source)
            }
            StateError::Io { path, source } => {
                write!(f, "state file {}: {}", path.display(), source)
            }
        }
    }
}

// ── Error trait implementations ─────────────────────────────────────

impl std::error::Error for MimicServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MimicServerError::Config(e) => Some(e),
            MimicServerError::State(e) => Some(e),
            MimicServerError::Io(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::NotFound { .. } => None,
            StateError::Corrupt { source, .. } => Some(source),
            StateError::Io { source, .. } => Some(source),
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl From<ConfigError> for MimicServerError {
    fn from(e: ConfigError) -> Self {
        MimicServerError::Config(e)
    }
}

impl From<StateError> for MimicServerError {
    fn from(e: StateError) -> Self {
        MimicServerError::State(e)
    }
}

impl From<io::Error> for MimicServerError {
    fn from(e: io::Error) -> Self {
        MimicServerError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_all_violations() {
        let err = ConfigError::Invalid {
            violations: vec![
                ConfigViolation::LeapIndicatorOutOfRange { value: 9 },
                ConfigViolation::PollRangeInvalid { min: 10, max: 4 },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("leap_indicator 9"));
        assert!(msg.contains("poll range 10-4"));
        assert!(msg.contains("; "));
    }

    #[test]
    fn test_state_error_display() {
        let err = StateError::NotFound {
            path: PathBuf::from("/tmp/state.json"),
        };
        assert_eq!(err.to_string(), "no state file at /tmp/state.json");
    }

    #[test]
    fn test_server_error_wraps_config() {
        let err = MimicServerError::from(ConfigError::Invalid {
            violations: vec![ConfigViolation::VersionOutOfRange { value: 0 }],
        });
        assert!(err.to_string().starts_with("configuration error:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
