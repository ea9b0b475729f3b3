//! Hexdump command implementation.
//!
//! ```text
//! 0x1000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use memview::{Address, ReadMemory, SnapshotMemory};

use super::address::format_address;

/// Run the hexdump command
pub fn run(snapshot: &Path, address: Address, size: usize, ascii: bool) -> Result<()> {
    let memory = SnapshotMemory::load(snapshot)
        .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
    let bytes = memory.read_bytes(address, size)?;

    println!("Hexdump at {} ({} bytes):", format_address(address), size);
    println!();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        println!("{}", format_line(address + (i * 16) as Address, chunk, ascii));
    }

    Ok(())
}

/// One row of up to 16 bytes
pub fn format_line(address: Address, chunk: &[u8], ascii: bool) -> String {
    let mut line = format!("{}: ", format_address(address));

    for j in 0..16 {
        if j == 8 {
            line.push(' ');
        }
        match chunk.get(j) {
            Some(byte) => line.push_str(&format!("{:02X} ", byte)),
            None => line.push_str("   "),
        }
    }

    if ascii {
        line.push_str(" |");
        for byte in chunk {
            line.push(if (0x20..0x7F).contains(byte) {
                *byte as char
            } else {
                '.'
            });
        }
        line.push_str(&" ".repeat(16 - chunk.len()));
        line.push('|');
    }

    line
}
