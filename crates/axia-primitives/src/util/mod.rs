//! Utility types for binary serialization.
//!
//! Provides `ByteReader` and `ByteWriter` for the AVM codec. Every
//! fixed-size integer on the wire is big-endian, and variable-length
//! fields carry an explicit length prefix (u16 for short strings, u32 for
//! byte blobs and arrays).

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for AVM codec binary data.
///
/// Wraps a byte slice and maintains a read position, providing methods
/// to read big-endian integers and length-prefixed byte blobs.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Create a reader that starts at `offset` within `data`.
    ///
    /// Used when a structure is embedded in a larger buffer stream.
    pub fn with_offset(data: &'a [u8], offset: usize) -> Self {
        ByteReader { data, pos: offset.min(data.len()) }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a big-endian u16 and advance the position by 2 bytes.
    pub fn read_u16(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    /// Read a big-endian u32 and advance the position by 4 bytes.
    pub fn read_u32(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    /// Read a big-endian u64 and advance the position by 8 bytes.
    pub fn read_u64(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_be_bytes(self.read_array::<8>()?))
    }

    /// Read a u32 length prefix followed by that many bytes.
    pub fn read_sized_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Return the current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer for AVM codec binary data.
///
/// Wraps a `Vec<u8>` and provides methods to append big-endian integers
/// and length-prefixed byte blobs.
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte to the buffer.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a big-endian u16 (2 bytes) to the buffer.
    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u32 (4 bytes) to the buffer.
    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u64 (8 bytes) to the buffer.
    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a u32 length prefix followed by the bytes themselves.
    pub fn write_sized_bytes(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_bytes(bytes);
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
