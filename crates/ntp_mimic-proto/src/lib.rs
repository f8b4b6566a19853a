// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! NTP wire protocol types and timestamp conversions for the `ntp_mimic` server.
//!
//! This crate provides the fixed 48-byte NTPv4 packet header model, a
//! big-endian codec over plain byte slices and over `std::io` streams, and
//! the Unix-time conversions used to populate NTP timestamp fields.

#![warn(missing_docs)]

/// Custom error types for buffer-based NTP packet parsing and serialization.
pub mod error;

/// NTP packet header types and constants (RFC 5905).
pub mod protocol;

/// Unix time conversion utilities for NTP timestamps.
pub mod unix_time;
