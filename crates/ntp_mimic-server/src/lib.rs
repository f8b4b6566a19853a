// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Simulated NTP server with a driftable clock and persisted session state.
//!
//! This crate answers NTPv4 client requests with timestamps drawn from a
//! simulated clock rather than the system clock. The simulated clock can run
//! at the true rate or diverge according to a configured drift model, and
//! every response can carry randomized jitter, stratum, poll/precision
//! exponents, and reference identifier. The simulation's internal variables
//! and its random seed can be persisted on shutdown and resumed on restart,
//! so a long-running scenario survives process restarts.
//!
//! The server processes datagrams strictly sequentially on one task; the
//! shutdown path is polled from that same task, which is what makes the
//! state snapshot safe without locking.

#![warn(missing_docs)]

// Re-export protocol types from mimic_proto for convenience.
pub use mimic_proto::{protocol, unix_time};

/// Simulated clock with configurable drift models.
pub mod clock;

/// Validated server configuration loaded from a JSON file.
pub mod config;

/// Custom error types for the simulated NTP server.
pub mod error;

/// Per-response randomization of jitter and protocol metadata.
pub mod randomize;

/// The tokio request loop.
pub mod server;

/// Pure per-request pipeline shared by the server loop and its tests.
pub mod server_common;

/// The long-lived simulation session: clock, random stream, request counter.
pub mod session;

/// Persistence of session state across restarts.
pub mod state;
