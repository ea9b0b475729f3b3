//! In-memory stand-in for a foreign address space.
//!
//! A snapshot is a set of disjoint regions captured from (or fabricated for) a
//! target process. It backs the unit tests and lets the CLI inspect dumps
//! offline. Regions can be marked read-only and address ranges can be made to
//! fault, which simulates pages vanishing between frames.

use std::cell::RefCell;
use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::reader::{Address, ReadMemory, WriteMemory};
use crate::error::{Error, Result};

/// One contiguous captured range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub base: Address,
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
    #[serde(default = "default_writable")]
    pub writable: bool,
}

fn default_writable() -> bool {
    true
}

impl Region {
    fn end(&self) -> Address {
        self.base + self.bytes.len() as Address
    }

    /// Byte range inside this region for `[address, address + size)`
    fn span(&self, address: Address, size: usize) -> Option<Range<usize>> {
        let end = address.checked_add(size as Address)?;
        if address < self.base || end > self.end() {
            return None;
        }
        let start = (address - self.base) as usize;
        Some(start..start + size)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    regions: Vec<Region>,
}

/// Region-based memory backing store
#[derive(Debug, Default)]
pub struct SnapshotMemory {
    regions: RefCell<Vec<Region>>,
    faults: RefCell<Vec<Range<Address>>>,
}

impl SnapshotMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zero-filled writable region
    pub fn with_region(self, base: Address, size: usize) -> Self {
        self.with_bytes(base, vec![0; size])
    }

    /// Add a writable region with the given contents
    pub fn with_bytes(self, base: Address, bytes: Vec<u8>) -> Self {
        self.regions.borrow_mut().push(Region {
            base,
            bytes,
            writable: true,
        });
        self
    }

    /// Add a region that rejects writes
    pub fn with_read_only(self, base: Address, bytes: Vec<u8>) -> Self {
        self.regions.borrow_mut().push(Region {
            base,
            bytes,
            writable: false,
        });
        self
    }

    /// Make every access overlapping `range` fail until [`clear_faults`](Self::clear_faults)
    pub fn inject_fault(&self, range: Range<Address>) {
        self.faults.borrow_mut().push(range);
    }

    pub fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
    }

    pub fn regions(&self) -> Vec<Region> {
        self.regions.borrow().clone()
    }

    fn faulted(&self, address: Address, size: usize) -> bool {
        let end = address.saturating_add(size as Address);
        self.faults
            .borrow()
            .iter()
            .any(|f| address < f.end && f.start < end)
    }

    /// Parse a snapshot from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let mut file: SnapshotFile = serde_json::from_str(json)?;
        file.regions.sort_by_key(|r| r.base);
        if let Some(pair) = file.regions.windows(2).find(|w| w[0].end() > w[1].base) {
            return Err(Error::InvalidSnapshot(format!(
                "regions at {:#x} and {:#x} overlap",
                pair[0].base, pair[1].base
            )));
        }
        let snapshot = Self::new();
        *snapshot.regions.borrow_mut() = file.regions;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = SnapshotFile {
            regions: self.regions(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Load a snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let snapshot = Self::from_json(&content)?;
        debug!(
            "Loaded snapshot {} ({} regions)",
            path.as_ref().display(),
            snapshot.regions.borrow().len()
        );
        Ok(snapshot)
    }

    /// Save the snapshot to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl ReadMemory for SnapshotMemory {
    fn read_bytes(&self, address: Address, size: usize) -> Result<Vec<u8>> {
        let failed = || Error::MemoryReadFailed { address, size };
        if self.faulted(address, size) {
            return Err(failed());
        }
        let regions = self.regions.borrow();
        regions
            .iter()
            .find_map(|r| r.span(address, size).map(|span| r.bytes[span].to_vec()))
            .ok_or_else(failed)
    }
}

impl WriteMemory for SnapshotMemory {
    fn write_bytes(&self, address: Address, bytes: &[u8]) -> Result<()> {
        let size = bytes.len();
        let failed = || Error::MemoryWriteFailed { address, size };
        if self.faulted(address, size) {
            return Err(failed());
        }
        let mut regions = self.regions.borrow_mut();
        let (region, span) = regions
            .iter_mut()
            .find_map(|r| r.span(address, size).map(|span| (r, span)))
            .ok_or_else(failed)?;
        if !region.writable {
            return Err(failed());
        }
        region.bytes[span].copy_from_slice(bytes);
        Ok(())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if digits.len() % 2 != 0 {
            return Err(de::Error::custom("odd number of hex digits"));
        }
        digits
            .chunks(2)
            .map(|pair| {
                let pair = std::str::from_utf8(pair).map_err(de::Error::custom)?;
                u8::from_str_radix(pair, 16).map_err(de::Error::custom)
            })
            .collect()
    }
}
