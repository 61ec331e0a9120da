use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Short read at address {address:#x}: needed {needed} bytes, got {got}")]
    ShortRead {
        address: u64,
        needed: usize,
        got: usize,
    },

    #[error("Invalid unicode state word {value:#x}: exceeds 0xff")]
    InvalidState { value: u64 },

    #[error("Header at address {address:#x} matches no known string layout")]
    UnrecognizedVariant { address: u64 },

    #[error("Payload length {actual} disagrees with declared length {declared}")]
    ConsistencyMismatch { declared: u64, actual: u64 },

    #[error("Permission denied reading memory of process {pid} (root privileges required)")]
    PermissionDenied { pid: u32 },

    #[error("Address {address:#x} is outside every readable region")]
    AddressOutOfRange { address: u64 },

    #[error("Failed to parse memory map entry: {0}")]
    MapsParse(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
