//! Rendering of decoded objects for human consumption.

mod console;
mod hex;

pub use console::format_object_console;
pub use hex::format_hex_dump;
