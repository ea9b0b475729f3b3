//! Address arguments.
//!
//! Addresses are hex, with or without `0x`, and may be written as a sum so a
//! field can be named relative to its structure:
//!
//! ```text
//! 0x2_0000_0000+0x3D5C
//! ```

use anyhow::{Context, Result, bail};
use memview::Address;

/// Clap value parser for address arguments
pub fn parse_address(s: &str) -> Result<Address> {
    let mut total: Address = 0;
    for term in s.split('+') {
        let digits = term
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X")
            .replace('_', "");
        if digits.is_empty() {
            bail!("Empty term in address '{}'", s);
        }
        let value = Address::from_str_radix(&digits, 16)
            .with_context(|| format!("Invalid hex address term '{}'", term.trim()))?;
        total = total
            .checked_add(value)
            .with_context(|| format!("Address '{}' overflows 64 bits", s))?;
    }
    Ok(total)
}

pub fn format_address(address: Address) -> String {
    format!("0x{:X}", address)
}
