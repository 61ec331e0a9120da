//! Primitive field decoders.
//!
//! Each field kind is a stateless capability: it knows its byte width on the
//! native platform, how to consume exactly that many bytes from a cursor, and
//! how to render a decoded value for display. Widths follow the C ABI of the
//! inspected interpreter (`Py_ssize_t`, pointers, `long`, `int`), so the
//! decoder must run on the same architecture as the target process.

use std::os::raw::{c_int, c_long};

use serde::Serialize;

use crate::error::Result;
use crate::object::status::StatusFlags;
use crate::process::{ByteCursor, ReadMemory};

/// Tag identifying a field's type and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// `Py_ssize_t`: object sizes and string lengths.
    SizeWord,
    /// A native pointer (`PyTypeObject *`, cached `char *`).
    Pointer,
    /// C `long`: the byte-string cached hash.
    NativeLong,
    /// C `int`: the byte-string interning state.
    NativeInt,
    /// NUL-terminated byte payload trailing a fixed header.
    CharString,
    /// `wchar_t *`: legacy wide-character buffer address.
    WideCharPointer,
    /// `Py_hash_t`: cached unicode hash.
    HashWord,
    /// Bit-packed unicode state word.
    StatusWord,
}

impl FieldKind {
    /// Byte width of the field on the native platform.
    ///
    /// [`FieldKind::CharString`] reports only its one-byte terminator; the
    /// payload is variable-length and not part of any fixed prefix.
    pub fn size(self) -> usize {
        match self {
            FieldKind::SizeWord | FieldKind::HashWord | FieldKind::StatusWord => {
                size_of::<usize>()
            }
            FieldKind::Pointer | FieldKind::WideCharPointer => size_of::<*const ()>(),
            FieldKind::NativeLong => size_of::<c_long>(),
            FieldKind::NativeInt => size_of::<c_int>(),
            FieldKind::CharString => 1,
        }
    }

    /// Consume exactly [`size`](Self::size) bytes (or, for
    /// [`FieldKind::CharString`], scan to the NUL) and decode the value.
    pub fn read<R: ReadMemory + ?Sized>(
        self,
        cursor: &mut ByteCursor<'_, R>,
    ) -> Result<FieldValue> {
        match self {
            FieldKind::StatusWord => Ok(FieldValue::Status(StatusFlags::read(cursor)?)),
            FieldKind::CharString => Ok(FieldValue::Bytes(cursor.read_cstring())),
            _ => Ok(FieldValue::Word(read_word(cursor, self.size())?)),
        }
    }

    /// Render a decoded value the way the field is conventionally displayed:
    /// decimal plus zero-padded hex for numeric fields, decoded text plus a
    /// hex string for byte payloads, binary plus named bits for the state.
    pub fn format(self, value: &FieldValue) -> String {
        match (self, value) {
            (_, FieldValue::Word(v)) => {
                format!("{0} ({0:01$x})", v, self.size() * 2)
            }
            (_, FieldValue::Bytes(bytes)) => {
                format!("{} ({})", String::from_utf8_lossy(bytes), hex_string(bytes))
            }
            (_, FieldValue::Status(status)) => status.to_string(),
        }
    }
}

/// A decoded field value, fully materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Any fixed-width numeric field, widened to 64 bits.
    Word(u64),
    /// A byte-string payload.
    Bytes(Vec<u8>),
    /// The decoded state word.
    Status(StatusFlags),
}

impl FieldValue {
    pub fn as_word(&self) -> Option<u64> {
        match self {
            FieldValue::Word(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_status(&self) -> Option<StatusFlags> {
        match self {
            FieldValue::Status(s) => Some(*s),
            _ => None,
        }
    }
}

/// Read a little-endian unsigned integer of the given byte width.
pub(crate) fn read_word<R: ReadMemory + ?Sized>(
    cursor: &mut ByteCursor<'_, R>,
    width: usize,
) -> Result<u64> {
    let bytes = cursor.read_bytes(width)?;
    let mut value = 0u64;
    for (i, byte) in bytes.iter().enumerate() {
        value |= (*byte as u64) << (8 * i);
    }
    Ok(value)
}

/// Lowercase hex rendering of a byte string, without separators.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
