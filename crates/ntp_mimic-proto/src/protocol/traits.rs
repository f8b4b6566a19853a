use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io;

use crate::error::ParseError;

/// A trait for writing any of the NTP header types to network-endian bytes.
///
/// A blanket implementation is provided for all types that implement
/// `byteorder::WriteBytesExt`.
pub trait WriteBytes {
    /// Writes an NTP header type to this writer in network byte order.
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()>;
}

/// A trait for reading any of the NTP header types from network-endian bytes.
///
/// A blanket implementation is provided for all types that implement
/// `byteorder::ReadBytesExt`.
pub trait ReadBytes {
    /// Reads an NTP header type from this reader in network byte order.
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P>;
}

/// NTP header types that may be written to network endian bytes.
pub trait WriteToBytes {
    /// Write the value to the given writer.
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()>;
}

/// NTP header types that may be read from network endian bytes.
pub trait ReadFromBytes: Sized {
    /// Read the value from the given reader.
    fn read_from_bytes<R: ReadBytesExt>(reader: R) -> io::Result<Self>;
}

/// Types that have a constant size when written to or read from bytes.
pub trait ConstPackedSizeBytes {
    /// The constant size in bytes when this type is packed for network transmission.
    const PACKED_SIZE_BYTES: usize;
}

/// Parse a type from a byte slice, returning the parsed value and the number
/// of bytes consumed.
///
/// Unlike [`ReadFromBytes`], this trait operates directly on `&[u8]` slices,
/// which is how the server parses incoming datagrams without an intermediate
/// reader.
pub trait FromBytes: Sized {
    /// Parse from the given byte slice. Returns the parsed value and the
    /// number of bytes consumed from the front of `buf`.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError>;
}

/// Serialize a type into a byte slice, returning the number of bytes written.
pub trait ToBytes {
    /// Write this value into the given byte slice. Returns the number of bytes
    /// written. Fails with [`ParseError::BufferTooShort`] if `buf` is too short.
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError>;
}
