#![cfg_attr(not(target_os = "linux"), allow(dead_code, unused_imports, unused_variables))]

use std::fs::File;
use std::io::ErrorKind;

use tracing::debug;

use crate::error::{Error, Result};
use crate::process::cursor::ByteCursor;
use crate::process::maps::{self, MemoryRegion};

/// Trait for reading memory from a process or buffer.
///
/// Reads address the backing memory by absolute virtual address rather than
/// a moving file pointer, so independent cursors over one source may issue
/// reads at different offsets in parallel. The trait also enables mocking
/// for tests.
pub trait ReadMemory {
    /// Read exactly `size` bytes starting at `address`.
    ///
    /// Fails with [`Error::ShortRead`] if fewer bytes are available.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;
}

/// Read-only view of a live process's memory, backed by `/proc/<pid>/mem`.
///
/// Valid offsets are constrained to the readable regions enumerated from the
/// process's mapping table at open time.
pub struct ProcessMemory {
    file: File,
    pid: u32,
    regions: Vec<MemoryRegion>,
}

impl ProcessMemory {
    /// Open a process's memory for reading.
    ///
    /// Fails with [`Error::PermissionDenied`] when the caller lacks the
    /// privilege to read the target (ptrace scope or non-root).
    #[cfg(target_os = "linux")]
    pub fn open(pid: u32) -> Result<Self> {
        let regions = maps::enumerate_regions(pid)?;
        let file = File::open(format!("/proc/{pid}/mem")).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => Error::PermissionDenied { pid },
            _ => Error::Io(e),
        })?;
        debug!("Opened process {pid} with {} readable regions", regions.len());
        Ok(Self { file, pid, regions })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(pid: u32) -> Result<Self> {
        Err(Error::Io(std::io::Error::other(
            "Linux only: process memory access not supported on this platform",
        )))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Readable regions enumerated from the mapping table at open time.
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Open a positioned byte cursor at an absolute virtual address.
    ///
    /// Fails with [`Error::AddressOutOfRange`] if the address is not covered
    /// by any readable region.
    pub fn cursor(&self, address: u64) -> Result<ByteCursor<'_, Self>> {
        if !self.regions.iter().any(|r| r.contains(address)) {
            return Err(Error::AddressOutOfRange { address });
        }
        Ok(ByteCursor::new(self, address))
    }
}

impl ReadMemory for ProcessMemory {
    #[cfg(target_os = "linux")]
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        use std::os::unix::fs::FileExt;

        let mut buffer = vec![0u8; size];
        let mut got = 0;

        while got < size {
            let n = self
                .file
                .read_at(&mut buffer[got..], address + got as u64)
                .map_err(|e| match e.kind() {
                    ErrorKind::PermissionDenied => Error::PermissionDenied { pid: self.pid },
                    // Reads beyond the mapped address space fail with EIO.
                    _ => Error::ShortRead {
                        address,
                        needed: size,
                        got,
                    },
                })?;
            if n == 0 {
                break;
            }
            got += n;
        }

        if got != size {
            return Err(Error::ShortRead {
                address,
                needed: size,
                got,
            });
        }

        Ok(buffer)
    }

    #[cfg(not(target_os = "linux"))]
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        Err(Error::ShortRead {
            address,
            needed: size,
            got: 0,
        })
    }
}
