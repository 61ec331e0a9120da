//! Hex dump formatting.

/// Render bytes as classic hex-dump lines: address, hex columns, ASCII.
pub fn format_hex_dump(address: u64, bytes: &[u8]) -> Vec<String> {
    let bytes_per_line = 16;
    let mut lines = Vec::new();

    for (i, chunk) in bytes.chunks(bytes_per_line).enumerate() {
        let addr = address + (i * bytes_per_line) as u64;
        let hex_part: String = chunk
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");

        let ascii_part: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
            .collect();

        lines.push(format!("{addr:016x}  {hex_part:47}  {ascii_part}"));
    }

    lines
}
