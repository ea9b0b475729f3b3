use std::cell::OnceCell;

use super::{Remote, Scope, field_address, swallow};
use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory, WriteMemory};

/// Builds a sub-structure view from its owner and resolved address.
///
/// The owner is passed so the factory can choose the sub-view's context: the
/// owner's raw memory handle, the owner itself, or one of its attributes
/// (e.g. a lookup table owned elsewhere).
pub type Factory<O, T> = fn(&O, Address) -> T;

/// Sub-structure embedded by value at a fixed offset.
///
/// Its address is an immutable function of the owner's base, so the view is
/// built once and kept in a cache slot owned by the owning instance. The
/// embedded structure cannot be replaced as a whole; mutate its fields.
pub struct ValueField<O, T> {
    key: &'static str,
    factory: Factory<O, T>,
    scope: Scope,
}

impl<O, T> ValueField<O, T> {
    pub const fn new(key: &'static str, factory: Factory<O, T>) -> Self {
        Self {
            key,
            factory,
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

    pub fn address<'a>(&self, owner: &O) -> Result<Address>
    where
        O: Remote<'a>,
    {
        field_address(owner, self.key, self.scope)
    }

    /// Cached sub-view, or `None` when the owner address is null.
    ///
    /// `cache` must belong to `owner`; nothing is cached on failure.
    pub fn get<'o, 'a>(&self, owner: &O, cache: &'o OnceCell<T>) -> Option<&'o T>
    where
        O: Remote<'a>,
    {
        if let Some(cached) = cache.get() {
            return Some(cached);
        }
        match self.address(owner) {
            Ok(address) => Some(cache.get_or_init(|| (self.factory)(owner, address))),
            Err(e) => {
                swallow(owner.offsets(), self.key, &e);
                None
            }
        }
    }
}

/// Sub-structure reached through a pointer stored at a fixed offset.
///
/// The foreign process may reseat the pointer at any time, so every access
/// re-reads it and builds a fresh view. Never cached.
pub struct PointerField<O, T> {
    key: &'static str,
    factory: Factory<O, T>,
    scope: Scope,
}

impl<O, T> PointerField<O, T> {
    pub const fn new(key: &'static str, factory: Factory<O, T>) -> Self {
        Self {
            key,
            factory,
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

    /// Address of the pointer slot itself
    pub fn slot<'a>(&self, owner: &O) -> Result<Address>
    where
        O: Remote<'a>,
    {
        field_address(owner, self.key, self.scope)
    }

    pub fn try_get<'a>(&self, owner: &O) -> Result<Option<T>>
    where
        O: Remote<'a>,
    {
        let slot = self.slot(owner)?;
        let target = owner.handle().memory().read_address(slot)?;
        Ok((target != 0).then(|| (self.factory)(owner, target)))
    }

    /// Fresh sub-view, or `None` for a null pointer or any access failure
    pub fn get<'a>(&self, owner: &O) -> Option<T>
    where
        O: Remote<'a>,
    {
        self.try_get(owner).unwrap_or_else(|e| {
            swallow(owner.offsets(), self.key, &e);
            None
        })
    }

    /// Point the slot at `target`. Ownership of the target memory is unchanged.
    pub fn set_address<'a>(&self, owner: &O, target: Address) -> Result<()>
    where
        O: Remote<'a>,
        O::Memory: WriteMemory,
    {
        let slot = self.slot(owner)?;
        owner.handle().memory().write_address(slot, target)
    }

    /// Point the slot at an existing view
    pub fn set<'a, V>(&self, owner: &O, target: &V) -> Result<()>
    where
        O: Remote<'a>,
        O::Memory: WriteMemory,
        V: Remote<'a> + ?Sized,
    {
        self.set_address(owner, target.handle().address())
    }
}

/// Either struct descriptor, for code that handles fields generically
pub enum StructField<O, T> {
    Value(ValueField<O, T>),
    Pointer(PointerField<O, T>),
}

impl<O, T> StructField<O, T> {
    pub fn key(&self) -> &'static str {
        match self {
            StructField::Value(f) => f.key(),
            StructField::Pointer(f) => f.key(),
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, StructField::Pointer(_))
    }

    /// Fresh view of the sub-structure, bypassing any cache
    pub fn resolve<'a>(&self, owner: &O) -> Option<T>
    where
        O: Remote<'a>,
    {
        match self {
            StructField::Value(f) => f.address(owner).ok().map(|a| (f.factory)(owner, a)),
            StructField::Pointer(f) => f.get(owner),
        }
    }

    /// Rewrite the pointer slot; value-embedded structs reject assignment
    pub fn assign<'a>(&self, owner: &O, target: Address) -> Result<()>
    where
        O: Remote<'a>,
        O::Memory: WriteMemory,
    {
        match self {
            StructField::Value(f) => Err(Error::InvalidAssignment(f.key().to_string())),
            StructField::Pointer(f) => f.set_address(owner, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::field::{Handle, Scalar};
    use crate::memory::{MemoryExt, ReadMemory, SnapshotMemory};
    use crate::offset::OffsetTable;

    /// Small view built by the factories below
    struct Inner<'a> {
        handle: Handle<'a, SnapshotMemory>,
        offsets: Arc<OffsetTable>,
    }

    impl<'a> Remote<'a> for Inner<'a> {
        type Memory = SnapshotMemory;

        fn handle(&self) -> Handle<'a, SnapshotMemory> {
            self.handle
        }

        fn offsets(&self) -> &OffsetTable {
            &self.offsets
        }
    }

    struct Outer<'a> {
        handle: Handle<'a, SnapshotMemory>,
        offsets: Arc<OffsetTable>,
        inner_offsets: Arc<OffsetTable>,
        embedded: OnceCell<Inner<'a>>,
    }

    impl<'a> Remote<'a> for Outer<'a> {
        type Memory = SnapshotMemory;

        fn handle(&self) -> Handle<'a, SnapshotMemory> {
            self.handle
        }

        fn offsets(&self) -> &OffsetTable {
            &self.offsets
        }
    }

    impl<'a> Outer<'a> {
        const EMBEDDED: ValueField<Self, Inner<'a>> = ValueField::new("embedded", Self::inner_at);
        const LINKED: PointerField<Self, Inner<'a>> = PointerField::new("linked", Self::inner_at);
        const GLOBAL_EMBEDDED: ValueField<Self, Inner<'a>> =
            ValueField::new("embedded", Self::inner_at).global();
        const GLOBAL_LINKED: PointerField<Self, Inner<'a>> =
            PointerField::new("linked", Self::inner_at).global();

        fn new(memory: &'a SnapshotMemory, address: Address) -> Self {
            Self {
                handle: Handle::new(memory, address),
                offsets: Arc::new(
                    OffsetTable::builder("outer")
                        .field("embedded", 0x10)
                        .field("linked", 0x30)
                        .build(),
                ),
                inner_offsets: Arc::new(OffsetTable::builder("inner").field("value", 0x4).build()),
                embedded: OnceCell::new(),
            }
        }

        /// Inner views share the owner's memory but use their own table
        fn inner_at(&self, address: Address) -> Inner<'a> {
            Inner {
                handle: self.handle.at(address),
                offsets: Arc::clone(&self.inner_offsets),
            }
        }

        fn embedded(&self) -> Option<&Inner<'a>> {
            Self::EMBEDDED.get(self, &self.embedded)
        }
    }

    const VALUE: Scalar<u32> = Scalar::new("value", 0);

    fn memory() -> SnapshotMemory {
        SnapshotMemory::new()
            .with_region(0x1000, 0x100)
            .with_region(0x2000, 0x100)
            .with_region(0x3000, 0x100)
    }

    #[test]
    fn test_value_field_is_cached() {
        let mem = memory();
        let outer = Outer::new(&mem, 0x1000);

        let first = outer.embedded().unwrap();
        let second = outer.embedded().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.handle.address(), 0x1010);

        mem.write_pod(0x1014, 99u32).unwrap();
        assert_eq!(VALUE.get(second), 99);
    }

    #[test]
    fn test_value_field_null_owner_is_absent_and_not_cached() {
        let mem = memory();
        let outer = Outer::new(&mem, 0);
        assert!(outer.embedded().is_none());
        assert!(outer.embedded.get().is_none());
    }

    #[test]
    fn test_pointer_field_follows_reseated_pointer() {
        let mem = memory();
        let outer = Outer::new(&mem, 0x1000);
        mem.write_address(0x1030, 0x2000).unwrap();
        mem.write_pod(0x2004, 1u32).unwrap();
        mem.write_pod(0x3004, 2u32).unwrap();

        let first = Outer::LINKED.get(&outer).unwrap();
        mem.write_address(0x1030, 0x3000).unwrap();
        let second = Outer::LINKED.get(&outer).unwrap();

        assert_eq!(first.handle.address(), 0x2000);
        assert_eq!(second.handle.address(), 0x3000);
        assert_eq!(VALUE.get(&first), 1);
        assert_eq!(VALUE.get(&second), 2);
    }

    #[test]
    fn test_pointer_field_null_and_failure_are_absent() {
        let mem = memory();
        let outer = Outer::new(&mem, 0x1000);
        assert!(Outer::LINKED.get(&outer).is_none());

        mem.inject_fault(0x1030..0x1038);
        assert!(Outer::LINKED.get(&outer).is_none());
        assert!(Outer::LINKED.try_get(&outer).is_err());
    }

    #[test]
    fn test_pointer_field_assignment_rewrites_slot() {
        let mem = memory();
        let outer = Outer::new(&mem, 0x1000);
        let target = outer.inner_at(0x3000);

        Outer::LINKED.set(&outer, &target).unwrap();
        assert_eq!(mem.read_address(0x1030).unwrap(), 0x3000);
        assert_eq!(Outer::LINKED.get(&outer).unwrap().handle.address(), 0x3000);
    }

    #[test]
    fn test_static_struct_fields_ignore_instance_address() {
        let mem = memory().with_region(0x0, 0x100);
        mem.write_address(0x30, 0x3000).unwrap();
        mem.write_address(0x1030, 0x1000).unwrap();

        for address in [0x1000, 0] {
            let outer = Outer::new(&mem, address);
            let cache = OnceCell::new();
            let embedded = Outer::GLOBAL_EMBEDDED.get(&outer, &cache).unwrap();
            assert_eq!(embedded.handle.address(), 0x10);
            let linked = Outer::GLOBAL_LINKED.get(&outer).unwrap();
            assert_eq!(linked.handle.address(), 0x3000);
        }

        let outer = Outer::new(&mem, 0x1000);
        Outer::GLOBAL_LINKED.set_address(&outer, 0x2000).unwrap();
        assert_eq!(mem.read_address(0x30).unwrap(), 0x2000);
        assert_eq!(mem.read_address(0x1030).unwrap(), 0x1000);
    }

    #[test]
    fn test_struct_field_assignment_rules() {
        let mem = memory();
        let outer = Outer::new(&mem, 0x1000);

        let value = StructField::Value(Outer::EMBEDDED);
        let pointer = StructField::Pointer(Outer::LINKED);

        assert!(matches!(
            value.assign(&outer, 0x2000),
            Err(Error::InvalidAssignment(key)) if key == "embedded"
        ));
        pointer.assign(&outer, 0x2000).unwrap();
        assert!(pointer.is_pointer());
        assert_eq!(pointer.resolve(&outer).unwrap().handle.address(), 0x2000);
        assert_eq!(value.resolve(&outer).unwrap().handle.address(), 0x1010);
    }
}
