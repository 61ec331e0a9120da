//! Bit-packed unicode state word.
//!
//! CPython packs the interning state, storage kind, compactness, ASCII-ness
//! and readiness of a unicode object into the low byte of one `Py_ssize_t`
//! sized word. Everything above the low byte must be zero in a live object.

use std::fmt;

use serde::Serialize;
use strum::{FromRepr, IntoStaticStr};

use crate::error::{Error, Result};
use crate::object::field::{FieldKind, read_word};
use crate::process::{ByteCursor, ReadMemory};

/// Decoded sub-fields of the unicode state word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    /// Raw low byte the flags were decoded from.
    pub raw: u8,
    /// Interning state (bits 0-1): 0 not interned, 1 mortal, 2 immortal.
    pub interned: u8,
    /// Storage kind (bits 2-4): 0 unset, otherwise code-unit width in bytes.
    pub kind: u8,
    /// Character data is stored inline after the header (bit 5).
    pub compact: bool,
    /// Every character is 7-bit ASCII (bit 6).
    pub ascii: bool,
    /// Canonical representation is materialized (bit 7).
    pub ready: bool,
}

impl StatusFlags {
    /// Decode the sub-fields of a raw state byte.
    pub fn from_raw(raw: u8) -> Self {
        Self {
            raw,
            interned: raw & 0b11,
            kind: (raw >> 2) & 0b111,
            compact: (raw >> 5) & 1 == 1,
            ascii: (raw >> 6) & 1 == 1,
            ready: (raw >> 7) & 1 == 1,
        }
    }

    /// Read one state word and decode its low byte.
    ///
    /// Fails with [`Error::InvalidState`] if the word exceeds 0xff.
    pub fn read<R: ReadMemory + ?Sized>(cursor: &mut ByteCursor<'_, R>) -> Result<Self> {
        let value = read_word(cursor, FieldKind::StatusWord.size())?;
        if value > 0xff {
            return Err(Error::InvalidState { value });
        }
        Ok(Self::from_raw(value as u8))
    }

    /// Code-unit width named by the kind field, if the kind is a defined one.
    pub fn code_unit(self) -> Option<CodeUnit> {
        CodeUnit::from_repr(self.kind)
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08b} (interned={} kind={} compact={} ascii={} ready={})",
            self.raw,
            self.interned,
            self.kind,
            self.compact as u8,
            self.ascii as u8,
            self.ready as u8
        )
    }
}

/// Bytes per character in the densest sufficient representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum CodeUnit {
    #[strum(serialize = "1-byte")]
    OneByte = 1,
    #[strum(serialize = "2-byte")]
    TwoByte = 2,
    #[strum(serialize = "4-byte")]
    FourByte = 4,
}

impl CodeUnit {
    /// Width of one code unit in bytes.
    pub fn width(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}
