//! Typed decoding of CPython string objects from raw memory.
//!
//! Two interpreter ABI generations are covered: the Python 2 byte string
//! ([`PyStringObject`]) with its single fixed shape, and the Python 3
//! unicode object ([`PyUnicodeObject`]) whose physical layout is chosen by
//! a bit-packed state word.

mod bytes_string;
pub mod field;
mod record;
mod status;
mod unicode;

use std::fmt;

use serde::Serialize;
use strum::IntoStaticStr;

pub use bytes_string::{PY_STRING, PyStringObject};
pub use field::{FieldKind, FieldValue};
pub use record::{DecodedField, DecodedRecord, RecordSchema};
pub use status::{CodeUnit, StatusFlags};
pub use unicode::{PY_UNICODE_HEADER, PyUnicodeObject, UnicodeHeader};

/// The physically distinct object layouts this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
pub enum ObjectVariant {
    /// Python 2 `str`: fixed header, inline NUL-terminated payload.
    #[strum(serialize = "legacy bytes string")]
    BytesString,
    /// Python 3 compact ASCII string: payload immediately follows the
    /// common header.
    #[strum(serialize = "compact ascii unicode")]
    CompactAscii,
    /// Python 3 compact non-ASCII string: three extra header fields, then
    /// inline code units.
    #[strum(serialize = "compact unicode")]
    CompactUnicode,
    /// Python 3 legacy string before materialization: placeholder with no
    /// character data.
    #[strum(serialize = "legacy unicode, not ready")]
    LegacyNotReady,
    /// Python 3 legacy string with materialized canonical data.
    #[strum(serialize = "legacy unicode, ready")]
    LegacyReady,
}

impl ObjectVariant {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ObjectVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
