use thiserror::Error;

use crate::memory::Address;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {size} bytes of process memory at {address:#x}")]
    MemoryReadFailed { address: Address, size: usize },

    #[error("Failed to write {size} bytes of process memory at {address:#x}")]
    MemoryWriteFailed { address: Address, size: usize },

    #[error("Null pointer: {0}")]
    NullPointer(&'static str),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Operation needs a known element count, but the overlay is unsized")]
    Unsized,

    #[error("Field '{field}' not found in offset table '{table}'")]
    UnknownField { table: String, field: String },

    #[error("Field '{field}' is declared as {actual}, not {expected}")]
    SlotMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Bit field '{field}' ({width} bits at bit {bit}) does not fit in a 64-bit word")]
    BitRange { field: String, bit: u64, width: u32 },

    #[error("String field '{field}' claims {len} bytes")]
    StringLength { field: String, len: u64 },

    #[error("Cannot assign to value-embedded struct field '{0}'")]
    InvalidAssignment(String),

    #[error("Field '{field}' expects a {expected} value")]
    TypeMismatch { field: String, expected: String },

    #[error("Invalid signature pattern: {0}")]
    InvalidPattern(String),

    #[error("Signature not found: {0}")]
    PatternNotFound(String),

    #[error("Invalid game version: {0}")]
    InvalidVersion(String),

    #[error("Invalid memory snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from the OS refusing a memory access
    pub fn is_access_failure(&self) -> bool {
        matches!(
            self,
            Error::MemoryReadFailed { .. } | Error::MemoryWriteFailed { .. }
        )
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
