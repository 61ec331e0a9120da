//! Regions command implementation.
//!
//! Lists the readable memory regions of a process, as enumerated from its
//! mapping table. Candidate object addresses must fall inside one of these.

use anyhow::Result;
use pymem_core::ProcessMemory;
use tracing::debug;

/// Run the regions command
pub fn run(pid: u32, json: bool) -> Result<()> {
    let memory = ProcessMemory::open(pid)?;
    let regions = memory.regions();
    debug!("Process {pid} has {} readable regions", regions.len());

    if json {
        println!("{}", serde_json::to_string_pretty(regions)?);
        return Ok(());
    }

    for region in regions {
        println!(
            "{:016x}-{:016x} {:10} {}",
            region.start,
            region.end,
            region.len(),
            region.name
        );
    }
    println!("{} readable regions", regions.len());

    Ok(())
}
