//! Console report formatting with colored output

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::object::DecodedRecord;
use crate::render::hex::format_hex_dump;

/// Format a decoded record for console display.
///
/// Returns a multi-line report: a title naming the layout and address, one
/// line per decoded field, and a hex dump of the in-memory payload bytes
/// (offsets relative to the payload start).
pub fn format_object_console(record: &DecodedRecord, address: u64, payload: &[u8]) -> String {
    let mut output = String::new();

    match record.variant {
        Some(variant) => {
            let _ = writeln!(
                output,
                "{} at {:#x} [{}]",
                record.schema.bold(),
                address,
                variant.green()
            );
        }
        None => {
            let _ = writeln!(output, "{} at {:#x}", record.schema.bold(), address);
        }
    }

    for field in record.fields() {
        let _ = writeln!(output, "  {} = {}", field.name, field.kind.format(&field.value));
    }

    if !payload.is_empty() {
        let _ = writeln!(output, "  {}", "payload:".dimmed());
        for line in format_hex_dump(0, payload) {
            let _ = writeln!(output, "  {}", line.dimmed());
        }
    }

    output
}
