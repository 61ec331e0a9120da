//! Python 3 unicode objects.
//!
//! All 3.x string layouts share one fixed header; the bit-packed state word
//! (with the hash, length and wide-char pointer as tie-breakers) selects
//! which of four physical layouts the remaining bytes follow. Classification
//! is an ordered rule table evaluated top to bottom; the first matching rule
//! wins.
//!
//! See: <https://github.com/python/cpython/blob/3.7/Include/unicodeobject.h>

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::object::ObjectVariant;
use crate::object::field::{FieldKind, FieldValue, read_word};
use crate::object::record::{DecodedRecord, RecordSchema};
use crate::object::status::{CodeUnit, StatusFlags};
use crate::process::{ByteCursor, ReadMemory};

/// Fixed header shared by every 3.x unicode layout.
///
/// Only this prefix can be decoded uniformly; everything after it depends on
/// the decoded state, length and hash.
pub static PY_UNICODE_HEADER: RecordSchema = RecordSchema {
    name: "PyUnicodeObject",
    fields: &[
        (FieldKind::SizeWord, "ob_refcnt"),
        (FieldKind::Pointer, "ob_type"),
        (FieldKind::SizeWord, "length"),
        (FieldKind::HashWord, "hash"),
        (FieldKind::StatusWord, "state"),
        (FieldKind::WideCharPointer, "wstr"),
    ],
};

/// Decoded common header of a unicode object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnicodeHeader {
    pub ref_count: u64,
    pub type_ptr: u64,
    pub length: u64,
    pub hash: u64,
    pub state: StatusFlags,
    pub wstr: u64,
}

impl UnicodeHeader {
    /// Decode the fixed prefix at the cursor's position.
    pub fn read<R: ReadMemory + ?Sized>(cursor: &mut ByteCursor<'_, R>) -> Result<Self> {
        let record = PY_UNICODE_HEADER.read(cursor)?;
        Ok(Self {
            ref_count: record.word("ob_refcnt"),
            type_ptr: record.word("ob_type"),
            length: record.word("length"),
            hash: record.word("hash"),
            state: record.status("state"),
            wstr: record.word("wstr"),
        })
    }

    /// Pick the physical layout the bytes after this header follow.
    ///
    /// Returns `None` when no rule matches; the object is then an
    /// unrecognized layout, never a best-effort guess.
    pub fn classify(&self) -> Option<ObjectVariant> {
        RULES
            .iter()
            .find(|(applies, _)| applies(self))
            .map(|(_, variant)| *variant)
    }
}

/// Classification rules, evaluated top to bottom. Several layouts share a
/// tail shape and differ in one discriminating flag, so the order is part of
/// the contract.
const RULES: &[(fn(&UnicodeHeader) -> bool, ObjectVariant)] = &[
    (compact_ascii, ObjectVariant::CompactAscii),
    (compact_non_ascii, ObjectVariant::CompactUnicode),
    (legacy_not_ready, ObjectVariant::LegacyNotReady),
    (legacy_ready, ObjectVariant::LegacyReady),
];

fn compact_ascii(header: &UnicodeHeader) -> bool {
    let st = header.state;
    st.kind == 1 && st.compact && st.ascii && st.ready
}

fn compact_non_ascii(header: &UnicodeHeader) -> bool {
    let st = header.state;
    st.code_unit().is_some() && st.compact && !st.ascii && st.ready
}

fn legacy_not_ready(header: &UnicodeHeader) -> bool {
    let st = header.state;
    st.kind == 0
        && !st.compact
        && !st.ascii
        && !st.ready
        && st.interned == 0
        && header.length == 0
        && header.hash == hash_sentinel()
        && header.wstr == 0
}

fn legacy_ready(header: &UnicodeHeader) -> bool {
    // ascii may be either value here
    let st = header.state;
    st.code_unit().is_some() && !st.compact && st.ready
}

/// All-ones `Py_hash_t`: the hash has not been computed yet.
fn hash_sentinel() -> u64 {
    let bits = 8 * FieldKind::HashWord.size();
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// A decoded Python 3 unicode object, tagged by the layout that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyUnicodeObject {
    pub variant: ObjectVariant,
    pub ref_count: u64,
    pub type_ptr: u64,
    /// Declared length in characters, not bytes.
    pub length: u64,
    pub hash: u64,
    pub state: StatusFlags,
    pub wstr: u64,
    /// Cached UTF-8 length; absent on the compact ASCII layout.
    pub utf8_length: Option<u64>,
    /// Cached UTF-8 buffer address; absent on the compact ASCII layout.
    pub utf8_ptr: Option<u64>,
    /// Wide-string length; absent on the compact ASCII layout.
    pub wstr_length: Option<u64>,
    /// Character payload exactly as it appears in memory.
    pub raw_data: Vec<u8>,
    /// Payload decoded and re-encoded as UTF-8.
    pub text: String,
}

impl PyUnicodeObject {
    /// Decode the object at the cursor's position.
    ///
    /// The fixed header is decoded first; the decoded state, length, hash
    /// and wide-char pointer then select the tail layout, which is consumed
    /// field by field.
    pub fn read<R: ReadMemory + ?Sized>(cursor: &mut ByteCursor<'_, R>) -> Result<Self> {
        let address = cursor.address();
        let header = UnicodeHeader::read(cursor)?;
        let variant = header
            .classify()
            .ok_or(Error::UnrecognizedVariant { address })?;
        debug!("Classified object at {address:#x} as {variant}");

        match variant {
            ObjectVariant::CompactAscii => Self::read_compact_ascii(cursor, header),
            _ => Self::read_extended(cursor, header, variant),
        }
    }

    /// Compact ASCII tail: exactly `length` payload bytes immediately after
    /// the header, no further fields.
    fn read_compact_ascii<R: ReadMemory + ?Sized>(
        cursor: &mut ByteCursor<'_, R>,
        header: UnicodeHeader,
    ) -> Result<Self> {
        let data = cursor.read_cstring();
        if data.len() as u64 != header.length {
            return Err(Error::ConsistencyMismatch {
                declared: header.length,
                actual: data.len() as u64,
            });
        }
        // ASCII is a subset of UTF-8; anything else means the header lied.
        let text = String::from_utf8(data.clone())
            .map_err(|e| Error::Encoding(format!("compact ascii payload: {e}")))?;

        Ok(Self {
            variant: ObjectVariant::CompactAscii,
            ref_count: header.ref_count,
            type_ptr: header.type_ptr,
            length: header.length,
            hash: header.hash,
            state: header.state,
            wstr: header.wstr,
            utf8_length: None,
            utf8_ptr: None,
            wstr_length: None,
            raw_data: data,
            text,
        })
    }

    /// Every other layout carries three more fields, then `length` code
    /// units of `width(kind)` bytes each. A not-ready legacy object has no
    /// character data at all.
    fn read_extended<R: ReadMemory + ?Sized>(
        cursor: &mut ByteCursor<'_, R>,
        header: UnicodeHeader,
        variant: ObjectVariant,
    ) -> Result<Self> {
        let utf8_length = read_word(cursor, FieldKind::SizeWord.size())?;
        let utf8_ptr = read_word(cursor, FieldKind::Pointer.size())?;
        let wstr_length = read_word(cursor, FieldKind::SizeWord.size())?;

        let (raw_data, text) = match header.state.code_unit() {
            Some(unit) => {
                let raw = cursor.read_bytes(header.length as usize * unit.width())?;
                let text = decode_code_units(&raw, unit)?;
                (raw, text)
            }
            // Placeholder object: no text has been materialized yet.
            None => (Vec::new(), String::new()),
        };

        Ok(Self {
            variant,
            ref_count: header.ref_count,
            type_ptr: header.type_ptr,
            length: header.length,
            hash: header.hash,
            state: header.state,
            wstr: header.wstr,
            utf8_length: Some(utf8_length),
            utf8_ptr: Some(utf8_ptr),
            wstr_length: Some(wstr_length),
            raw_data,
            text,
        })
    }

    /// View of the object as a named-field record.
    ///
    /// The `data` field carries the payload re-encoded as UTF-8, matching
    /// the decoded text rather than the in-memory code units.
    pub fn to_record(&self) -> DecodedRecord {
        let mut record =
            DecodedRecord::new(PY_UNICODE_HEADER.name).with_variant(self.variant);
        record.push("ob_refcnt", FieldKind::SizeWord, FieldValue::Word(self.ref_count));
        record.push("ob_type", FieldKind::Pointer, FieldValue::Word(self.type_ptr));
        record.push("length", FieldKind::SizeWord, FieldValue::Word(self.length));
        record.push("hash", FieldKind::HashWord, FieldValue::Word(self.hash));
        record.push("state", FieldKind::StatusWord, FieldValue::Status(self.state));
        record.push("wstr", FieldKind::WideCharPointer, FieldValue::Word(self.wstr));
        if let Some(utf8_length) = self.utf8_length {
            record.push("utf8_length", FieldKind::SizeWord, FieldValue::Word(utf8_length));
        }
        if let Some(utf8_ptr) = self.utf8_ptr {
            record.push("utf8", FieldKind::Pointer, FieldValue::Word(utf8_ptr));
        }
        if let Some(wstr_length) = self.wstr_length {
            record.push("wstr_length", FieldKind::SizeWord, FieldValue::Word(wstr_length));
        }
        record.push(
            "data",
            FieldKind::CharString,
            FieldValue::Bytes(self.text.as_bytes().to_vec()),
        );
        record
    }
}

impl fmt::Display for PyUnicodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_record())
    }
}

/// Decode inline code units to text, re-encoded as UTF-8.
fn decode_code_units(bytes: &[u8], unit: CodeUnit) -> Result<String> {
    match unit {
        CodeUnit::OneByte => String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Encoding(format!("1-byte payload: {e}"))),
        CodeUnit::TwoByte => {
            let (text, _, had_errors) = encoding_rs::UTF_16LE.decode(bytes);
            if had_errors {
                return Err(Error::Encoding("invalid utf-16le payload".to_string()));
            }
            Ok(text.into_owned())
        }
        CodeUnit::FourByte => bytes
            .chunks_exact(4)
            .map(|chunk| {
                let unit = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                char::from_u32(unit)
                    .ok_or_else(|| Error::Encoding(format!("invalid utf-32le unit {unit:#x}")))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockMemoryBuilder;

    fn header_with_state(raw: u8) -> UnicodeHeader {
        UnicodeHeader {
            ref_count: 1,
            type_ptr: 0xa0_0000,
            length: 3,
            hash: 0xbeef,
            state: StatusFlags::from_raw(raw),
            wstr: 0,
        }
    }

    fn build_object(state: u8, length: u64) -> MockMemoryBuilder {
        MockMemoryBuilder::new()
            .push_word(1) // ob_refcnt
            .push_word(0xa0_0000) // ob_type
            .push_word(length)
            .push_word(0xbeef) // hash
            .push_word(state as u64)
            .push_word(0) // wstr
    }

    #[test]
    fn test_classify_compact_ascii() {
        // kind=1, compact, ascii, ready
        let header = header_with_state(0b1110_0100);
        assert_eq!(header.classify(), Some(ObjectVariant::CompactAscii));
    }

    #[test]
    fn test_classify_compact_non_ascii_all_widths() {
        for kind in [1u8, 2, 4] {
            // compact, ready, not ascii
            let header = header_with_state(0b1010_0000 | (kind << 2));
            assert_eq!(
                header.classify(),
                Some(ObjectVariant::CompactUnicode),
                "kind {kind}"
            );
        }
    }

    #[test]
    fn test_classify_legacy_not_ready() {
        let header = UnicodeHeader {
            ref_count: 1,
            type_ptr: 0xa0_0000,
            length: 0,
            hash: hash_sentinel(),
            state: StatusFlags::from_raw(0),
            wstr: 0,
        };
        assert_eq!(header.classify(), Some(ObjectVariant::LegacyNotReady));
    }

    #[test]
    fn test_legacy_not_ready_requires_every_tie_break() {
        let base = UnicodeHeader {
            ref_count: 1,
            type_ptr: 0xa0_0000,
            length: 0,
            hash: hash_sentinel(),
            state: StatusFlags::from_raw(0),
            wstr: 0,
        };
        assert!(legacy_not_ready(&base));

        let mut hashed = base;
        hashed.hash = 42;
        assert!(!legacy_not_ready(&hashed));

        let mut sized = base;
        sized.length = 1;
        assert!(!legacy_not_ready(&sized));

        let mut wide = base;
        wide.wstr = 0x7000;
        assert!(!legacy_not_ready(&wide));
    }

    #[test]
    fn test_classify_legacy_ready_either_ascii_bit() {
        for state in [0b1000_1000u8, 0b1100_1000] {
            // kind=2, not compact, ready; ascii varies
            let header = header_with_state(state);
            assert_eq!(
                header.classify(),
                Some(ObjectVariant::LegacyReady),
                "state {state:08b}"
            );
        }
    }

    #[test]
    fn test_undefined_kind_matches_no_rule() {
        // kind=3 is undefined; compact+ready+non-ascii otherwise
        let header = header_with_state(0b1010_1100);
        assert_eq!(header.classify(), None);
    }

    #[test]
    fn test_read_compact_ascii() {
        let reader = build_object(0b1110_0100, 5).push_cstr(b"hello").build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        assert_eq!(obj.variant, ObjectVariant::CompactAscii);
        assert_eq!(obj.text, "hello");
        assert_eq!(obj.raw_data, b"hello");
        assert_eq!(obj.utf8_length, None);
        assert_eq!(obj.utf8_ptr, None);
        assert_eq!(obj.wstr_length, None);
        // Exactly `length` payload bytes were consumed after the header.
        assert_eq!(
            cursor.address(),
            0x1000 + PY_UNICODE_HEADER.fixed_size() as u64 + 5
        );
    }

    #[test]
    fn test_read_compact_ascii_length_mismatch() {
        let reader = build_object(0b1110_0100, 9).push_cstr(b"hello").build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        match PyUnicodeObject::read(&mut cursor) {
            Err(Error::ConsistencyMismatch { declared, actual }) => {
                assert_eq!(declared, 9);
                assert_eq!(actual, 5);
            }
            other => panic!("expected ConsistencyMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_read_compact_utf16() {
        // status 0b10101000: kind=2, compact, not ascii, ready
        let reader = build_object(0b1010_1000, 3)
            .push_word(6) // utf8_length
            .push_word(0) // utf8 pointer
            .push_word(3) // wstr_length
            .push_bytes(&[0x30, 0x04, 0x31, 0x04, 0x32, 0x04])
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        assert_eq!(obj.variant, ObjectVariant::CompactUnicode);
        assert_eq!(obj.text, "абв");
        assert_eq!(obj.utf8_length, Some(6));
        assert_eq!(obj.wstr_length, Some(3));
        assert_eq!(obj.raw_data, vec![0x30, 0x04, 0x31, 0x04, 0x32, 0x04]);
    }

    #[test]
    fn test_utf16_roundtrip_preserves_tail_bytes() {
        let reader = build_object(0b1010_1000, 3)
            .push_word(6)
            .push_word(0)
            .push_word(3)
            .push_utf16le("абв")
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        let reencoded: Vec<u8> = obj
            .text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        assert_eq!(reencoded, obj.raw_data);
    }

    #[test]
    fn test_read_compact_utf32() {
        // kind=4, compact, not ascii, ready
        let reader = build_object(0b1011_0000, 2)
            .push_word(0)
            .push_word(0)
            .push_word(2)
            .push_utf32le("a€")
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        assert_eq!(obj.text, "a€");
        assert_eq!(obj.raw_data.len(), 8);
    }

    #[test]
    fn test_read_legacy_not_ready_has_no_payload() {
        let reader = MockMemoryBuilder::new()
            .push_word(1)
            .push_word(0xa0_0000)
            .push_word(0) // length
            .push_word(hash_sentinel())
            .push_word(0) // state
            .push_word(0) // wstr
            .push_word(0) // utf8_length
            .push_word(0) // utf8 pointer
            .push_word(0) // wstr_length
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        assert_eq!(obj.variant, ObjectVariant::LegacyNotReady);
        assert_eq!(obj.text, "");
        assert!(obj.raw_data.is_empty());
        assert_eq!(obj.utf8_length, Some(0));
    }

    #[test]
    fn test_read_legacy_ready_utf16() {
        // kind=2, not compact, ready, ascii clear
        let reader = build_object(0b1000_1000, 2)
            .push_word(4)
            .push_word(0)
            .push_word(2)
            .push_utf16le("hi")
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        assert_eq!(obj.variant, ObjectVariant::LegacyReady);
        assert_eq!(obj.text, "hi");
    }

    #[test]
    fn test_read_unrecognized_layout() {
        // kind=3 is undefined
        let reader = build_object(0b1010_1100, 3).build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        match PyUnicodeObject::read(&mut cursor) {
            Err(Error::UnrecognizedVariant { address }) => assert_eq!(address, 0x1000),
            other => panic!("expected UnrecognizedVariant, got {other:?}"),
        }
    }

    #[test]
    fn test_read_short_tail() {
        // Declares 4 UCS-2 characters but supplies only 2 bytes.
        let reader = build_object(0b1010_1000, 4)
            .push_word(0)
            .push_word(0)
            .push_word(4)
            .push_bytes(&[0x30, 0x04])
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        assert!(matches!(
            PyUnicodeObject::read(&mut cursor),
            Err(Error::ShortRead { .. })
        ));
    }

    #[test]
    fn test_read_rejects_invalid_state_word() {
        let reader = MockMemoryBuilder::new()
            .push_word(1)
            .push_word(0xa0_0000)
            .push_word(0)
            .push_word(0)
            .push_word(0x1_0000) // state word above 0xff
            .push_word(0)
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        assert!(matches!(
            PyUnicodeObject::read(&mut cursor),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_record_view_carries_variant_and_tail_fields() {
        let reader = build_object(0b1010_1000, 3)
            .push_word(6)
            .push_word(0x55aa)
            .push_word(3)
            .push_utf16le("абв")
            .build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyUnicodeObject::read(&mut cursor).unwrap();
        let record = obj.to_record();
        assert_eq!(record.variant, Some(ObjectVariant::CompactUnicode));
        assert_eq!(record.word("utf8"), 0x55aa);
        assert_eq!(record.bytes("data"), "абв".as_bytes());
    }
}
