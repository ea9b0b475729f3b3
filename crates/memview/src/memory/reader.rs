//! Raw memory access traits.
//!
//! These are the only points where the crate touches the target process.
//! A platform backend (e.g. `ReadProcessMemory` on Windows) implements
//! [`ReadMemory`] and [`WriteMemory`]; everything else is built on top.

use bytemuck::Pod;

use crate::error::{Error, Result};

/// Absolute address inside the target process
pub type Address = u64;

/// Size of a pointer in the target process (64-bit targets only)
pub const POINTER_SIZE: usize = std::mem::size_of::<Address>();

/// Read access to a foreign address space.
///
/// Every method may fail with [`Error::MemoryReadFailed`](crate::Error) when
/// the page is unmapped or protected. No method may panic on a bad address.
pub trait ReadMemory {
    fn read_bytes(&self, address: Address, size: usize) -> Result<Vec<u8>>;

    fn read_u8(&self, address: Address) -> Result<u8> {
        self.read_pod(address)
    }

    fn read_u16(&self, address: Address) -> Result<u16> {
        self.read_pod(address)
    }

    fn read_u32(&self, address: Address) -> Result<u32> {
        self.read_pod(address)
    }

    fn read_i32(&self, address: Address) -> Result<i32> {
        self.read_pod(address)
    }

    fn read_u64(&self, address: Address) -> Result<u64> {
        self.read_pod(address)
    }

    fn read_f32(&self, address: Address) -> Result<f32> {
        self.read_pod(address)
    }

    /// Read a pointer-sized value
    fn read_address(&self, address: Address) -> Result<Address> {
        self.read_pod(address)
    }
}

/// Write access to a foreign address space.
///
/// Writes go through `&self`: the target memory is not owned by the caller,
/// and backends only hold an OS handle.
pub trait WriteMemory {
    fn write_bytes(&self, address: Address, bytes: &[u8]) -> Result<()>;

    /// Write a pointer-sized value
    fn write_address(&self, address: Address, value: Address) -> Result<()> {
        self.write_bytes(address, bytemuck::bytes_of(&value))
    }
}

/// Typed helpers over any [`ReadMemory`] implementation
pub trait MemoryExt: ReadMemory {
    fn read_pod<T: Pod>(&self, address: Address) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(address, size)?;
        if bytes.len() != size {
            return Err(Error::MemoryReadFailed { address, size });
        }
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    fn write_pod<T: Pod>(&self, address: Address, value: T) -> Result<()>
    where
        Self: WriteMemory,
    {
        self.write_bytes(address, bytemuck::bytes_of(&value))
    }
}

impl<M: ReadMemory + ?Sized> MemoryExt for M {}

impl<M: ReadMemory + ?Sized> ReadMemory for &M {
    fn read_bytes(&self, address: Address, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }
}

impl<M: WriteMemory + ?Sized> WriteMemory for &M {
    fn write_bytes(&self, address: Address, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }
}
