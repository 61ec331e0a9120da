//! Python 2 byte-string objects.
//!
//! See: <https://github.com/python/cpython/blob/2.7/Include/stringobject.h>

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::object::ObjectVariant;
use crate::object::field::{FieldKind, FieldValue};
use crate::object::record::{DecodedRecord, RecordSchema};
use crate::process::{ByteCursor, ReadMemory};

/// Memory layout of `PyStringObject`: one fixed shape, no variant dispatch.
pub static PY_STRING: RecordSchema = RecordSchema {
    name: "PyStringObject",
    fields: &[
        (FieldKind::SizeWord, "ob_refcnt"),
        (FieldKind::Pointer, "ob_type"),
        (FieldKind::SizeWord, "ob_size"),
        (FieldKind::NativeLong, "ob_shash"),
        (FieldKind::NativeInt, "ob_sstate"),
        (FieldKind::CharString, "ob_sval"),
    ],
};

/// A decoded Python 2 `str` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyStringObject {
    pub ref_count: u64,
    pub type_ptr: u64,
    pub size: u64,
    pub hash: u64,
    /// Interning state: 0 not interned, 1 mortal, 2 immortal.
    pub interning: u64,
    /// Payload bytes, without the terminator.
    pub payload: Vec<u8>,
}

impl PyStringObject {
    /// Decode the fixed shape at the cursor's position.
    pub fn read<R: ReadMemory + ?Sized>(cursor: &mut ByteCursor<'_, R>) -> Result<Self> {
        let record = PY_STRING.read(cursor)?;
        Ok(Self {
            ref_count: record.word("ob_refcnt"),
            type_ptr: record.word("ob_type"),
            size: record.word("ob_size"),
            hash: record.word("ob_shash"),
            interning: record.word("ob_sstate"),
            payload: record.bytes("ob_sval").to_vec(),
        })
    }

    /// View of the object as a named-field record.
    pub fn to_record(&self) -> DecodedRecord {
        let mut record =
            DecodedRecord::new(PY_STRING.name).with_variant(ObjectVariant::BytesString);
        record.push("ob_refcnt", FieldKind::SizeWord, FieldValue::Word(self.ref_count));
        record.push("ob_type", FieldKind::Pointer, FieldValue::Word(self.type_ptr));
        record.push("ob_size", FieldKind::SizeWord, FieldValue::Word(self.size));
        record.push("ob_shash", FieldKind::NativeLong, FieldValue::Word(self.hash));
        record.push("ob_sstate", FieldKind::NativeInt, FieldValue::Word(self.interning));
        record.push(
            "ob_sval",
            FieldKind::CharString,
            FieldValue::Bytes(self.payload.clone()),
        );
        record
    }
}

impl fmt::Display for PyStringObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::process::MockMemoryReader;

    // Dump of an interned three-byte string b'asd' from a 64-bit Python 2.7.
    const MEM_DUMP: &[u8] = &[
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ob_refcnt
        0x60, 0x9c, 0x8f, 0x00, 0x00, 0x00, 0x00, 0x00, // ob_type
        0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ob_size
        0xd7, 0xb2, 0x78, 0xa1, 0x50, 0x60, 0x2a, 0x14, // ob_shash
        0x01, 0x00, 0x00, 0x00, // ob_sstate
        b'a', b's', b'd', 0x00, // ob_sval
    ];

    #[test]
    fn test_read_reference_dump() {
        let reader = MockMemoryReader::new(MEM_DUMP.to_vec());
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyStringObject::read(&mut cursor).unwrap();
        assert_eq!(obj.ref_count, 1);
        assert_eq!(obj.type_ptr, 0x8f9c60);
        assert_eq!(obj.size, 3);
        assert_eq!(obj.hash, 0x142a6050a178b2d7);
        assert_eq!(obj.interning, 1);
        assert_eq!(obj.payload, b"asd");
    }

    #[test]
    fn test_read_fails_short_on_truncated_header() {
        let reader = MockMemoryReader::new(MEM_DUMP[..20].to_vec());
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        assert!(matches!(
            PyStringObject::read(&mut cursor),
            Err(Error::ShortRead { .. })
        ));
    }

    #[test]
    fn test_fixed_size_counts_terminator_only() {
        // Two size words, one pointer, a long, an int, plus the NUL.
        let expected = 2 * size_of::<usize>()
            + size_of::<*const ()>()
            + size_of::<std::os::raw::c_long>()
            + size_of::<std::os::raw::c_int>()
            + 1;
        assert_eq!(PY_STRING.fixed_size(), expected);
    }

    #[test]
    fn test_record_view_renders_payload() {
        let reader = MockMemoryReader::new(MEM_DUMP.to_vec());
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let obj = PyStringObject::read(&mut cursor).unwrap();
        let record = obj.to_record();
        assert_eq!(record.variant, Some(ObjectVariant::BytesString));
        assert_eq!(record.bytes("ob_sval"), b"asd");
        assert!(obj.to_string().contains("ob_sval = asd (617364)"));
    }
}
