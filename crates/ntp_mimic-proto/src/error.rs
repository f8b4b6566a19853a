// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for buffer-based NTP packet parsing and serialization.
//!
//! [`ParseError`] carries no heap allocation. It implements
//! [`std::error::Error`] and converts to [`std::io::Error`] so it can flow
//! through the stream-based reader/writer API unchanged.

use core::fmt;

/// Errors that can occur during buffer-based NTP packet parsing or serialization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The buffer is too short for the expected data.
    BufferTooShort {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// An invalid or unrecognized field value was encountered.
    InvalidField {
        /// Name of the field that was invalid.
        field: &'static str,
        /// The invalid value.
        value: u32,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BufferTooShort { needed, available } => {
                write!(
                    f,
                    "buffer too short: needed {} bytes, got {}",
                    needed, available
                )
            }
            ParseError::InvalidField { field, value } => {
                write!(f, "invalid {} value: {}", field, value)
            }
        }
    }
}

impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> std::io::Error {
        let kind = match &err {
            ParseError::BufferTooShort { .. } => std::io::ErrorKind::UnexpectedEof,
            ParseError::InvalidField { .. } => std::io::ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}

impl std::error::Error for ParseError {}
