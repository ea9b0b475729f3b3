use std::fmt;

use bytemuck::Pod;

use super::reader::{Address, MemoryExt, ReadMemory, WriteMemory};
use crate::error::Result;

/// Fixed-width scalar that can live in foreign memory.
///
/// Implemented for the signed/unsigned integers and floats; pointer-sized
/// values use `u64` ([`Address`]). Plain `#[repr(C)]` records may implement it
/// too, so overlays can step over arrays of them.
pub trait Primitive: Pod + Default + PartialEq + fmt::Debug {
    const NAME: &'static str;
    const WIDTH: usize = std::mem::size_of::<Self>();

    fn read<M: ReadMemory + ?Sized>(memory: &M, address: Address) -> Result<Self> {
        memory.read_pod(address)
    }

    fn write<M: WriteMemory + ?Sized>(memory: &M, address: Address, value: Self) -> Result<()> {
        memory.write_bytes(address, bytemuck::bytes_of(&value))
    }
}

macro_rules! primitive {
    ($($ty:ty),*) => {
        $(impl Primitive for $ty {
            const NAME: &'static str = stringify!($ty);
        })*
    };
}

primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
