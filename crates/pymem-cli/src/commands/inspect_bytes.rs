//! Inspect-bytes command implementation.
//!
//! Decodes a Python 2 byte-string object at a caller-supplied virtual
//! address. The layout is fixed, so no classification runs.

use anyhow::Result;
use pymem_core::{ProcessMemory, PyStringObject, format_object_console};
use tracing::debug;

/// Run the inspect-bytes command
pub fn run(pid: u32, address: u64, json: bool) -> Result<()> {
    let memory = ProcessMemory::open(pid)?;
    let mut cursor = memory.cursor(address)?;

    let obj = PyStringObject::read(&mut cursor)?;
    debug!("Decoded byte string of {} bytes at {address:#x}", obj.size);

    if json {
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    print!(
        "{}",
        format_object_console(&obj.to_record(), address, &obj.payload)
    );

    Ok(())
}
