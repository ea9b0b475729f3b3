//! Property descriptors: typed fields resolved against an offset table.
//!
//! A descriptor is a type-level value (usually an associated `const` of a
//! view) that knows a field key and how to decode it. Every access resolves
//! `base + table[key]` at the moment of the call; nothing about the address
//! is cached except value-embedded sub-structures (see [`ValueField`]).
//!
//! Failure policy: scalar, bit, vector and struct descriptors swallow access
//! failures and return a default (`get`), while the `try_*` variants expose
//! the underlying [`Error`]. Overlays in [`crate::overlay`] never swallow.

mod bits;
mod dynamic;
mod scalar;
mod structure;
mod text;
mod vector;

pub use bits::BitField;
pub use dynamic::{FieldType, Schema, Value};
pub use scalar::Scalar;
pub use structure::{Factory, PointerField, StructField, ValueField};
pub use text::{MAX_STRING_LEN, StringField};
pub use vector::VectorField;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory};
use crate::offset::OffsetTable;

/// Where a structure lives: a memory reference plus a base address.
///
/// A handle owns nothing. Copying it is free and never copies target memory.
pub struct Handle<'a, M: ?Sized> {
    memory: &'a M,
    address: Address,
}

impl<M: ?Sized> Clone for Handle<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for Handle<'_, M> {}

impl<M: ?Sized> std::fmt::Debug for Handle<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({:#x})", self.address)
    }
}

impl<'a, M: ?Sized> Handle<'a, M> {
    pub fn new(memory: &'a M, address: Address) -> Self {
        Self { memory, address }
    }

    pub fn memory(&self) -> &'a M {
        self.memory
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn is_null(&self) -> bool {
        self.address == 0
    }

    /// Handle to another address in the same process
    pub fn at(&self, address: Address) -> Self {
        Self::new(self.memory, address)
    }

    /// Nested view `delta` bytes past this one
    pub fn offset(&self, delta: u64) -> Self {
        self.at(self.address.wrapping_add(delta))
    }
}

impl<'a, M: ReadMemory + ?Sized> Handle<'a, M> {
    /// Follow the pointer stored at this address; `None` when it is null
    pub fn deref(&self) -> Result<Option<Self>> {
        let target = self.memory.read_address(self.address)?;
        Ok((target != 0).then(|| self.at(target)))
    }
}

/// An entity view over foreign memory.
///
/// Each instance carries the offset table it was built with, so views over
/// different game builds can coexist.
pub trait Remote<'a> {
    type Memory: ReadMemory + ?Sized + 'a;

    fn handle(&self) -> Handle<'a, Self::Memory>;

    fn offsets(&self) -> &OffsetTable;
}

/// Whether a field is relative to the instance or absolute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Instance,
    /// Process-wide singleton: resolves `0 + offset`, ignoring the instance address
    Static,
}

impl Scope {
    fn resolve(self, base: Address, offset: u64) -> Result<Address> {
        match self {
            Scope::Static => Ok(offset),
            Scope::Instance if base == 0 => Err(Error::NullPointer("instance address")),
            Scope::Instance => Ok(base.wrapping_add(offset)),
        }
    }
}

/// Absolute address of the byte-slot field `key` on `entity`
pub(crate) fn field_address<'a, E: Remote<'a> + ?Sized>(
    entity: &E,
    key: &str,
    scope: Scope,
) -> Result<Address> {
    let offset = entity.offsets().offset(key)?;
    scope.resolve(entity.handle().address(), offset)
}

/// Record a failure that a graceful accessor is about to replace with a default
pub(crate) fn swallow(table: &OffsetTable, key: &str, err: &Error) {
    match err {
        Error::UnknownField { .. }
        | Error::SlotMismatch { .. }
        | Error::BitRange { .. }
        | Error::StringLength { .. } => {
            warn!("{}.{}: {}", table.name(), key, err)
        }
        _ => trace!("{}.{}: {}, using default", table.name(), key, err),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{SnapshotMemory, WriteMemory};

    #[test]
    fn test_handle_offset_and_deref() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x20);
        mem.write_address(0x1008, 0x1010).unwrap();

        let handle = Handle::new(&mem, 0x1000);
        assert_eq!(handle.offset(8).address(), 0x1008);
        assert_eq!(handle.offset(8).deref().unwrap().unwrap().address(), 0x1010);
        assert!(handle.deref().unwrap().is_none());
        assert!(handle.at(0x9000).deref().is_err());
    }

    #[test]
    fn test_scope_resolve() {
        assert_eq!(Scope::Instance.resolve(0x1000, 0x10).unwrap(), 0x1010);
        assert_eq!(Scope::Static.resolve(0x1000, 0x10).unwrap(), 0x10);
        assert_eq!(Scope::Static.resolve(0, 0x10).unwrap(), 0x10);
        assert!(matches!(
            Scope::Instance.resolve(0, 0x10),
            Err(Error::NullPointer(_))
        ));
    }
}
