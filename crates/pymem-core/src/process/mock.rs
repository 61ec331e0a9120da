//! Mock memory reader for testing
//!
//! Provides a configurable implementation of the ReadMemory trait that reads
//! from an in-memory buffer instead of a live process.

use crate::error::{Error, Result};
use crate::process::ReadMemory;

/// Mock memory reader for testing
///
/// Reads from an in-memory buffer, allowing decoding logic to be exercised
/// without access to a real process.
#[derive(Debug, Clone)]
pub struct MockMemoryReader {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryReader {
    /// Create a new mock reader with the given data at base address 0x1000
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, base: 0x1000 }
    }

    /// Create a new mock reader with a custom base address
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self { data, base }
    }

    /// Base address of the buffer
    pub fn base_address(&self) -> u64 {
        self.base
    }

    /// Size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address < self.base {
            return Err(Error::AddressOutOfRange { address });
        }
        let offset = (address - self.base) as usize;
        if offset >= self.data.len() {
            return Err(Error::ShortRead {
                address,
                needed: size,
                got: 0,
            });
        }
        if offset + size > self.data.len() {
            return Err(Error::ShortRead {
                address,
                needed: size,
                got: self.data.len() - offset,
            });
        }
        Ok(self.data[offset..offset + size].to_vec())
    }
}

/// Builder for creating test memory buffers
///
/// Provides a fluent API for laying out object bytes for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryBuilder {
    /// Create a new builder with the default base address (0x1000)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
        }
    }

    /// Set the base address for the mock reader
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Append an unsigned 32-bit little-endian integer
    pub fn push_u32(mut self, value: u32) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append an unsigned 64-bit little-endian integer
    pub fn push_u64(mut self, value: u64) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a native-width little-endian word
    pub fn push_word(self, value: u64) -> Self {
        if size_of::<usize>() == 8 {
            self.push_u64(value)
        } else {
            self.push_u32(value as u32)
        }
    }

    /// Append raw bytes
    pub fn push_bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append a NUL-terminated byte string
    pub fn push_cstr(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self.data.push(0);
        self
    }

    /// Append text encoded as UTF-16LE, without a terminator
    pub fn push_utf16le(mut self, text: &str) -> Self {
        for unit in text.encode_utf16() {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        self
    }

    /// Append text encoded as UTF-32LE, without a terminator
    pub fn push_utf32le(mut self, text: &str) -> Self {
        for ch in text.chars() {
            self.data.extend_from_slice(&(ch as u32).to_le_bytes());
        }
        self
    }

    /// Build the MockMemoryReader
    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            data: self.data,
            base: self.base,
        }
    }
}
