//! Types and constants for the fixed 48-byte NTP packet header.
//!
//! Provides a slice-level codec (`FromBytes`/`ToBytes`) plus `ReadBytes` and
//! `WriteBytes` extensions over the byteorder crate for reading and writing
//! header types from `std::io` streams in network byte order.
//!
//! Field layout and terminology follow IETF RFC 5905; only the header fields
//! the simulated server controls are modeled.

/// Default NTP port number.
pub const PORT: u16 = 123;

/// Maximum valid stratum number.
pub const MAXSTRAT: u8 = 16;

mod bytes;
mod io;
mod traits;
mod types;

pub use self::traits::*;
pub use self::types::*;
