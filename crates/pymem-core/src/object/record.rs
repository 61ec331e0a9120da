//! Structured record decoding.
//!
//! A [`RecordSchema`] lists typed fields in memory order; decoding walks the
//! schema and produces a [`DecodedRecord`]. Shapes whose tail depends on
//! already-decoded header values (the unicode layouts) decode their fixed
//! prefix through a schema, then continue field by field.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::object::ObjectVariant;
use crate::object::field::{FieldKind, FieldValue};
use crate::object::status::StatusFlags;
use crate::process::{ByteCursor, ReadMemory};

/// Ordered field layout of an object header.
///
/// Declared order equals physical field order. Schemas are process-wide
/// constants, created once and never mutated.
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [(FieldKind, &'static str)],
}

impl RecordSchema {
    /// Byte size of the fixed-width prefix.
    ///
    /// Variable-length tail data is excluded; a trailing
    /// [`FieldKind::CharString`] contributes only its terminator byte.
    pub fn fixed_size(&self) -> usize {
        self.fields.iter().map(|(kind, _)| kind.size()).sum()
    }

    /// Decode every field in declared order.
    pub fn read<R: ReadMemory + ?Sized>(
        &self,
        cursor: &mut ByteCursor<'_, R>,
    ) -> Result<DecodedRecord> {
        let mut record = DecodedRecord::new(self.name);
        for (kind, name) in self.fields {
            let value = kind.read(cursor)?;
            record.push(name, *kind, value);
        }
        Ok(record)
    }
}

/// One decoded field: its name, its type tag, its value.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub value: FieldValue,
}

/// Immutable mapping from field name to decoded value, in declaration order,
/// tagged by the variant that produced it once classification has run.
///
/// Values are fully materialized; nothing references the source stream.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedRecord {
    pub schema: &'static str,
    pub variant: Option<ObjectVariant>,
    fields: Vec<DecodedField>,
}

impl DecodedRecord {
    pub fn new(schema: &'static str) -> Self {
        Self {
            schema,
            variant: None,
            fields: Vec::new(),
        }
    }

    /// Tag the record with the variant that produced it.
    pub fn with_variant(mut self, variant: ObjectVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Append a field; continuation decoding uses this for tail fields.
    pub fn push(&mut self, name: &'static str, kind: FieldKind, value: FieldValue) {
        self.fields.push(DecodedField { name, kind, value });
    }

    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Numeric value of a named field.
    ///
    /// # Panics
    ///
    /// Panics if the schema declares no numeric field of that name; callers
    /// pass names from the static schema that produced the record.
    pub fn word(&self, name: &str) -> u64 {
        self.get(name)
            .and_then(FieldValue::as_word)
            .unwrap_or_else(|| panic!("schema {} has no numeric field {name}", self.schema))
    }

    /// Byte payload of a named field.
    ///
    /// # Panics
    ///
    /// Panics if the schema declares no byte-string field of that name.
    pub fn bytes(&self, name: &str) -> &[u8] {
        self.get(name)
            .and_then(FieldValue::as_bytes)
            .unwrap_or_else(|| panic!("schema {} has no byte-string field {name}", self.schema))
    }

    /// Decoded state word of a named field.
    ///
    /// # Panics
    ///
    /// Panics if the schema declares no state field of that name.
    pub fn status(&self, name: &str) -> StatusFlags {
        self.get(name)
            .and_then(|value| value.as_status())
            .unwrap_or_else(|| panic!("schema {} has no state field {name}", self.schema))
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", field.name, field.kind.format(&field.value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockMemoryBuilder;

    static PAIR: RecordSchema = RecordSchema {
        name: "pair",
        fields: &[
            (FieldKind::SizeWord, "first"),
            (FieldKind::SizeWord, "second"),
        ],
    };

    #[test]
    fn test_fixed_size_sums_field_widths() {
        assert_eq!(PAIR.fixed_size(), 2 * size_of::<usize>());
    }

    #[test]
    fn test_read_decodes_in_declared_order() {
        let reader = MockMemoryBuilder::new().push_word(7).push_word(9).build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let record = PAIR.read(&mut cursor).unwrap();
        assert_eq!(record.word("first"), 7);
        assert_eq!(record.word("second"), 9);
        assert_eq!(record.fields()[0].name, "first");
        assert_eq!(cursor.address(), 0x1000 + PAIR.fixed_size() as u64);
    }

    #[test]
    fn test_get_unknown_field_is_none() {
        let reader = MockMemoryBuilder::new().push_word(7).push_word(9).build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let record = PAIR.read(&mut cursor).unwrap();
        assert!(record.get("third").is_none());
    }

    #[test]
    fn test_display_renders_name_value_lines() {
        let reader = MockMemoryBuilder::new().push_word(3).push_word(0).build();
        let mut cursor = ByteCursor::new(&reader, 0x1000);

        let record = PAIR.read(&mut cursor).unwrap();
        let rendered = record.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("first = 3 ("));
    }
}
