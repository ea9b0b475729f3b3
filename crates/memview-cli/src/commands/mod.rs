//! CLI command implementations.

pub mod address;
pub mod hexdump;
pub mod layout;
pub mod party;
