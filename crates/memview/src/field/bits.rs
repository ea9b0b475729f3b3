use super::{Remote, Scope, swallow};
use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory, WriteMemory};

/// Sub-byte field packed inside an aligned word.
///
/// The table slot gives the bit offset from the structure base and the width.
/// The containing word is the smallest of 1/2/4/8 bytes covering the range.
#[derive(Debug, Clone, Copy)]
pub struct BitField {
    key: &'static str,
    scope: Scope,
}

/// Resolved location of the containing word
struct Word {
    address: Address,
    size: usize,
    shift: u32,
    mask: u64,
}

fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

fn word_size(shift: u32, width: u32) -> Option<usize> {
    match shift.checked_add(width)?.div_ceil(8) {
        0..=1 => Some(1),
        2 => Some(2),
        3..=4 => Some(4),
        5..=8 => Some(8),
        _ => None,
    }
}

impl Word {
    fn read<M: ReadMemory + ?Sized>(&self, memory: &M) -> Result<u64> {
        let bytes = memory.read_bytes(self.address, self.size)?;
        if bytes.len() != self.size {
            return Err(Error::MemoryReadFailed {
                address: self.address,
                size: self.size,
            });
        }
        let mut buf = [0u8; 8];
        buf[..self.size].copy_from_slice(&bytes[..self.size]);
        Ok(u64::from_le_bytes(buf))
    }

    fn write<M: WriteMemory + ?Sized>(&self, memory: &M, word: u64) -> Result<()> {
        memory.write_bytes(self.address, &word.to_le_bytes()[..self.size])
    }
}

impl BitField {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            scope: Scope::Instance,
        }
    }

    pub const fn global(self) -> Self {
        Self {
            scope: Scope::Static,
            ..self
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    fn word<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Result<Word> {
        let (bit, width) = entity.offsets().bits(self.key)?;
        let shift = (bit % 8) as u32;
        let size = word_size(shift, width).ok_or_else(|| Error::BitRange {
            field: self.key.to_string(),
            bit,
            width,
        })?;
        Ok(Word {
            address: self.scope.resolve(entity.handle().address(), bit / 8)?,
            size,
            shift,
            mask: mask(width),
        })
    }

    pub fn try_get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Result<u64> {
        let word = self.word(entity)?;
        let raw = word.read(entity.handle().memory())?;
        Ok((raw >> word.shift) & word.mask)
    }

    /// Read the bits, or 0 on any failure
    pub fn get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> u64 {
        self.try_get(entity).unwrap_or_else(|e| {
            swallow(entity.offsets(), self.key, &e);
            0
        })
    }

    /// Read-modify-write of the containing word.
    ///
    /// Not atomic with respect to the target process: a concurrent write to
    /// neighbouring bits between the read and the write is lost.
    pub fn try_set<'a, E>(&self, entity: &E, value: u64) -> Result<()>
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        let word = self.word(entity)?;
        let memory = entity.handle().memory();
        let raw = word.read(memory)?;
        let cleared = raw & !(word.mask << word.shift);
        word.write(memory, cleared | ((value & word.mask) << word.shift))
    }

    /// Best-effort write; failures are dropped
    pub fn set<'a, E>(&self, entity: &E, value: u64)
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        if let Err(e) = self.try_set(entity, value) {
            swallow(entity.offsets(), self.key, &e);
        }
    }
}
