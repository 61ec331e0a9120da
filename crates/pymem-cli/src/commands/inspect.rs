//! Inspect command implementation.
//!
//! Decodes a Python 3 unicode object at a caller-supplied virtual address
//! and prints a per-field report. A failed decode is terminal: the caller
//! decides whether to try a different address.

use anyhow::Result;
use pymem_core::{ProcessMemory, PyUnicodeObject, format_object_console};
use tracing::debug;

/// Run the inspect command
pub fn run(pid: u32, address: u64, json: bool) -> Result<()> {
    let memory = ProcessMemory::open(pid)?;
    let mut cursor = memory.cursor(address)?;

    let obj = PyUnicodeObject::read(&mut cursor)?;
    debug!("Decoded {} at {address:#x}", obj.variant);

    if json {
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    print!(
        "{}",
        format_object_console(&obj.to_record(), address, &obj.raw_data)
    );

    Ok(())
}
