pub mod error;
pub mod object;
pub mod process;
pub mod render;

pub use error::{Error, Result};
pub use object::{
    CodeUnit, DecodedRecord, FieldKind, FieldValue, ObjectVariant, PyStringObject,
    PyUnicodeObject, RecordSchema, StatusFlags, UnicodeHeader,
};
pub use process::{ByteCursor, MemoryRegion, ProcessMemory, ReadMemory, enumerate_regions};
pub use render::{format_hex_dump, format_object_console};
