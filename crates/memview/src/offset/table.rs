use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::error::{Error, Result};

/// Location of one field inside a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Slot {
    /// Byte offset from the structure base
    Byte(u64),
    /// Bit range, `bit` counted from the structure base
    Bits { bit: u64, width: u32 },
}

/// Field layout of one structure for one game build.
///
/// Tables are immutable once built. Views hold them behind an `Arc` so every
/// instance resolves against the layout it was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    name: String,
    /// Structure size, used as the stride when the structure is repeated
    #[serde(default)]
    size: u64,
    slots: BTreeMap<String, Slot>,
}

impl OffsetTable {
    pub fn builder(name: impl Into<String>) -> OffsetTableBuilder {
        OffsetTableBuilder {
            table: OffsetTable {
                name: name.into(),
                size: 0,
                slots: BTreeMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn slot(&self, field: &str) -> Result<Slot> {
        self.slots
            .get(field)
            .copied()
            .ok_or_else(|| Error::UnknownField {
                table: self.name.clone(),
                field: field.to_string(),
            })
    }

    /// Byte offset of `field`
    pub fn offset(&self, field: &str) -> Result<u64> {
        match self.slot(field)? {
            Slot::Byte(offset) => Ok(offset),
            other => Err(self.mismatch(field, "byte", other)),
        }
    }

    /// Bit offset and width of `field`
    pub fn bits(&self, field: &str) -> Result<(u64, u32)> {
        match self.slot(field)? {
            Slot::Bits { bit, width } => Ok((bit, width)),
            other => Err(self.mismatch(field, "bits", other)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    fn mismatch(&self, field: &str, expected: &'static str, actual: Slot) -> Error {
        Error::SlotMismatch {
            field: format!("{}.{}", self.name, field),
            expected,
            actual: actual.into(),
        }
    }
}

pub struct OffsetTableBuilder {
    table: OffsetTable,
}

impl OffsetTableBuilder {
    pub fn field(mut self, name: &str, offset: u64) -> Self {
        self.table.slots.insert(name.to_string(), Slot::Byte(offset));
        self
    }

    pub fn bits(mut self, name: &str, bit: u64, width: u32) -> Self {
        self.table
            .slots
            .insert(name.to_string(), Slot::Bits { bit, width });
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.table.size = size;
        self
    }

    pub fn build(self) -> OffsetTable {
        self.table
    }
}

pub fn load_table<P: AsRef<Path>>(path: P) -> Result<OffsetTable> {
    let content = fs::read_to_string(&path)?;
    let table = serde_json::from_str(&content)?;
    Ok(table)
}

pub fn save_table<P: AsRef<Path>>(path: P, table: &OffsetTable) -> Result<()> {
    let content = serde_json::to_string_pretty(table)?;
    fs::write(path, content)?;
    Ok(())
}
