//! Positioned byte cursor over a memory source.

use crate::error::Result;
use crate::process::memory::ReadMemory;

/// A position-tracking cursor over a [`ReadMemory`] source.
///
/// The position is an absolute virtual address that advances with each read.
/// The position is mutable shared state: concurrent decoding requires
/// independent cursors, which are cheap to create and safe to use in
/// parallel over the same source.
pub struct ByteCursor<'a, R: ReadMemory + ?Sized> {
    reader: &'a R,
    address: u64,
}

impl<'a, R: ReadMemory + ?Sized> ByteCursor<'a, R> {
    /// Create a cursor positioned at the given absolute address.
    pub fn new(reader: &'a R, address: u64) -> Self {
        Self { reader, address }
    }

    /// Current absolute address.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Reposition the cursor to an absolute address.
    pub fn set_address(&mut self, address: u64) {
        self.address = address;
    }

    /// Read exactly `size` bytes and advance the position.
    ///
    /// Fails with [`crate::Error::ShortRead`] if fewer bytes remain; the
    /// position is unchanged on failure.
    pub fn read_bytes(&mut self, size: usize) -> Result<Vec<u8>> {
        let bytes = self.reader.read_bytes(self.address, size)?;
        self.address += size as u64;
        Ok(bytes)
    }

    /// Read bytes up to (but not including) the next NUL.
    ///
    /// The terminator is peeked, not consumed: on return the cursor points
    /// at the NUL, so a following decoder can still observe it. Running off
    /// the readable range ends the string like an end of stream.
    pub fn read_cstring(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.reader.read_bytes(self.address, 1) {
                Ok(byte) if byte[0] == 0 => break,
                Ok(byte) => {
                    out.push(byte[0]);
                    self.address += 1;
                }
                Err(_) => break,
            }
        }
        out
    }
}
