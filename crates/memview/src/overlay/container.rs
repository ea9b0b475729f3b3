use crate::error::{Error, Result};
use crate::field::Handle;
use crate::memory::{Address, POINTER_SIZE, ReadMemory};

/// Dynamic array described by a `first`/`last` pointer pair.
///
/// The two pointers sit at the handle's address. Both are re-read on every
/// call, so the length tracks the target process as it grows or shrinks the
/// buffer. Elements are views built by `factory` at `first + i * stride`.
pub struct Container<'a, M: ?Sized, F> {
    handle: Handle<'a, M>,
    stride: u64,
    factory: F,
}

impl<'a, M, F, T> Container<'a, M, F>
where
    M: ReadMemory + ?Sized,
    F: Fn(Handle<'a, M>) -> T,
{
    pub fn new(handle: Handle<'a, M>, stride: u64, factory: F) -> Self {
        Self {
            handle,
            stride,
            factory,
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Current `(first, last)` pair
    pub fn bounds(&self) -> Result<(Address, Address)> {
        if self.handle.is_null() {
            return Err(Error::NullPointer("container"));
        }
        let memory = self.handle.memory();
        let first = memory.read_address(self.handle.address())?;
        let last = memory.read_address(self.handle.offset(POINTER_SIZE as u64).address())?;
        Ok((first, last))
    }

    /// Element count; 0 for null or inverted bounds
    pub fn len(&self) -> Result<usize> {
        let (first, last) = self.bounds()?;
        Ok(self.count(first, last))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn count(&self, first: Address, last: Address) -> usize {
        if first == 0 || last == 0 || last < first || self.stride == 0 {
            return 0;
        }
        ((last - first) / self.stride) as usize
    }

    pub fn get(&self, index: usize) -> Result<T> {
        let (first, last) = self.bounds()?;
        let len = self.count(first, last);
        if index >= len {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                len,
            });
        }
        Ok(self.build(first, index))
    }

    /// Elements in address order, using the bounds read at the time of the call
    pub fn iter(&self) -> Result<impl Iterator<Item = T> + '_> {
        let (first, last) = self.bounds()?;
        let len = self.count(first, last);
        Ok((0..len).map(move |i| self.build(first, i)))
    }

    fn build(&self, first: Address, index: usize) -> T {
        let address = first + index as u64 * self.stride;
        (self.factory)(self.handle.at(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryExt, SnapshotMemory, WriteMemory};

    fn address_of(handle: Handle<'_, SnapshotMemory>) -> Address {
        handle.address()
    }

    fn container_memory(first: Address, last: Address) -> SnapshotMemory {
        let mem = SnapshotMemory::new()
            .with_region(0x100, 0x10)
            .with_region(0x1000, 0x40);
        mem.write_address(0x100, first).unwrap();
        mem.write_address(0x108, last).unwrap();
        mem
    }

    #[test]
    fn test_len_and_element_addresses() {
        let mem = container_memory(0x1000, 0x1018);
        let container = Container::new(Handle::new(&mem, 0x100), 8, address_of);

        assert_eq!(container.len().unwrap(), 3);
        assert_eq!(container.get(2).unwrap(), 0x1010);
        assert_eq!(
            container.iter().unwrap().collect::<Vec<_>>(),
            vec![0x1000, 0x1008, 0x1010]
        );
        assert!(matches!(
            container.get(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_bounds_are_reread() {
        let mem = container_memory(0x1000, 0x1008);
        let container = Container::new(Handle::new(&mem, 0x100), 8, address_of);
        assert_eq!(container.len().unwrap(), 1);

        mem.write_address(0x108, 0x1020).unwrap();
        assert_eq!(container.len().unwrap(), 4);
    }

    #[test]
    fn test_inverted_and_null_bounds_are_empty() {
        let inverted = container_memory(0x1018, 0x1000);
        let container = Container::new(Handle::new(&inverted, 0x100), 8, address_of);
        assert_eq!(container.len().unwrap(), 0);
        assert!(container.is_empty().unwrap());
        assert_eq!(container.iter().unwrap().count(), 0);

        let null = container_memory(0, 0x1018);
        let container = Container::new(Handle::new(&null, 0x100), 8, address_of);
        assert_eq!(container.len().unwrap(), 0);
    }

    #[test]
    fn test_factory_reads_elements() {
        let mem = container_memory(0x1000, 0x1010);
        mem.write_pod(0x1000, 5u32).unwrap();
        mem.write_pod(0x1008, 6u32).unwrap();
        let read = |h: Handle<'_, SnapshotMemory>| h.memory().read_u32(h.address()).unwrap_or(0);
        let container = Container::new(Handle::new(&mem, 0x100), 8, read);

        assert_eq!(container.iter().unwrap().collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_null_handle_and_unreadable_bounds_fail() {
        let mem = container_memory(0x1000, 0x1018);
        let null = Container::new(Handle::new(&mem, 0), 8, address_of);
        assert!(matches!(null.len(), Err(Error::NullPointer(_))));

        let unmapped = Container::new(Handle::new(&mem, 0x9000), 8, address_of);
        assert!(matches!(unmapped.len(), Err(Error::MemoryReadFailed { .. })));

        // the `last` slot would lie past the end of the address space
        let edge = Container::new(Handle::new(&mem, u64::MAX - 3), 8, address_of);
        assert!(edge.len().is_err());
    }
}
