//! Memory map enumeration via `/proc/<pid>/maps`.
//!
//! Only readable regions are retained: every valid offset into the process's
//! memory pseudo-file falls inside one of them.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// A readable region of a process's address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    /// First virtual address of the region.
    pub start: u64,
    /// One past the last virtual address of the region.
    pub end: u64,
    /// Backing path or pseudo-name (`[heap]`, `[stack]`, ...); empty for anonymous mappings.
    pub name: String,
}

impl MemoryRegion {
    /// Size of the region in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the region covers the given virtual address.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }
}

/// Enumerate the readable regions of a process from its mapping table.
pub fn enumerate_regions(pid: u32) -> Result<Vec<MemoryRegion>> {
    regions_from_file(format!("/proc/{pid}/maps"), pid)
}

/// Read and parse a mapping table from an arbitrary path.
///
/// Split out of [`enumerate_regions`] so tests can point it at a file
/// written with `tempfile` instead of a live process.
pub fn regions_from_file(path: impl AsRef<Path>, pid: u32) -> Result<Vec<MemoryRegion>> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => Error::PermissionDenied { pid },
        _ => Error::Io(e),
    })?;
    parse_maps(&content)
}

/// Parse mapping-table text, keeping only regions whose permission field
/// marks them readable.
///
/// Each line looks like:
///
/// ```text
/// 55d0a1e2d000-55d0a1e4e000 r--p 00000000 103:02 2621446  /usr/bin/python3
/// ```
pub fn parse_maps(content: &str) -> Result<Vec<MemoryRegion>> {
    let mut regions = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let range = parts
            .next()
            .ok_or_else(|| Error::MapsParse(line.to_string()))?;
        let perms = parts
            .next()
            .ok_or_else(|| Error::MapsParse(line.to_string()))?;

        if !perms.starts_with('r') {
            continue;
        }

        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| Error::MapsParse(line.to_string()))?;
        let start = u64::from_str_radix(start, 16)
            .map_err(|_| Error::MapsParse(line.to_string()))?;
        let end =
            u64::from_str_radix(end, 16).map_err(|_| Error::MapsParse(line.to_string()))?;

        // Columns 3-5 are offset, device and inode; the name is whatever follows.
        let name = parts.nth(3).map(str::to_string).unwrap_or_default();

        regions.push(MemoryRegion { start, end, name });
    }

    debug!("Parsed {} readable regions", regions.len());
    Ok(regions)
}
