mod cursor;
pub mod maps;
mod memory;

// Mock memory reader for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use cursor::ByteCursor;
pub use maps::{MemoryRegion, enumerate_regions, parse_maps};
pub use memory::{ProcessMemory, ReadMemory};

// Re-export mock for convenient access in tests
#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
