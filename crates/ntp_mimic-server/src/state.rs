// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Persistence of session state across restarts.
//!
//! The state file is a small JSON document holding exactly the variables the
//! drift engine and random stream need to continue after a restart. Loading
//! never silently defaults: a missing file and a corrupt file are reported as
//! distinct errors and the caller decides to fall back to a fresh session.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// The persisted snapshot of a simulation session.
///
/// `base_time` and `start_wall` anchor the simulated clock; `last_update`
/// and `current_drift` capture the random walk's progress; `random_seed`
/// reconstructs the deterministic random stream; `request_counter` counts
/// every answered request across restarts.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionState {
    /// The simulated clock's time anchor.
    pub base_time: SystemTime,
    /// The wall-clock instant at which the anchor was captured.
    pub start_wall: SystemTime,
    /// The wall-clock instant of the last drift-coefficient update.
    pub last_update: SystemTime,
    /// The accumulated drift coefficient in parts per million.
    pub current_drift: f64,
    /// The seed of the deterministic random stream.
    pub random_seed: u64,
    /// Total requests answered by this session.
    pub request_counter: u64,
}

/// Load persisted session state from `path`.
pub fn load(path: &Path) -> Result<SessionState, StateError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(StateError::NotFound {
                path: path.to_owned(),
            });
        }
        Err(source) => {
            return Err(StateError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };
    serde_json::from_str(&data).map_err(|source| StateError::Corrupt {
        path: path.to_owned(),
        source,
    })
}

/// Serialize `state` to `path`, overwriting any prior file.
pub fn save(path: &Path, state: &SessionState) -> Result<(), StateError> {
    let data = serde_json::to_string_pretty(state).map_err(|source| StateError::Corrupt {
        path: path.to_owned(),
        source,
    })?;
    fs::write(path, data).map_err(|source| StateError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Probe that `path` can be opened for writing.
///
/// Called at startup when persistence is enabled so an unwritable state path
/// aborts the process before the socket is bound. A probe that had to create
/// the file removes it again, leaving the load/fresh decision untouched.
pub fn check_writable(path: &Path) -> Result<(), StateError> {
    let existed = path.exists();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StateError::Io {
            path: path.to_owned(),
            source,
        })?;
    if !existed {
        let _ = fs::remove_file(path);
    }
    Ok(())
}
