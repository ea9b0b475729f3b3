use std::marker::PhantomData;

use super::Overlay;
use crate::error::{Error, Result};
use crate::field::Handle;
use crate::memory::{Address, Primitive, ReadMemory, WriteMemory};

/// Elements laid out from a fixed base address
pub struct Array<'a, M: ?Sized, T> {
    handle: Handle<'a, M>,
    len: Option<usize>,
    _element: PhantomData<T>,
}

impl<M: ?Sized, T> Clone for Array<'_, M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized, T> Copy for Array<'_, M, T> {}

impl<'a, M: ReadMemory + ?Sized, T: Primitive> Array<'a, M, T> {
    pub fn new(handle: Handle<'a, M>, len: usize) -> Self {
        Self {
            handle,
            len: Some(len),
            _element: PhantomData,
        }
    }

    /// Array of unknown length; iteration never terminates on its own
    pub fn unbounded(handle: Handle<'a, M>) -> Self {
        Self {
            handle,
            len: None,
            _element: PhantomData,
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub fn len(&self) -> Option<usize> {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == Some(0)
    }
}

impl<M: ReadMemory + ?Sized, T: Primitive> Overlay for Array<'_, M, T> {
    type Memory = M;
    type Element = T;

    fn memory(&self) -> &M {
        self.handle.memory()
    }

    fn base(&self) -> Result<Address> {
        if self.handle.is_null() {
            return Err(Error::NullPointer("array base"));
        }
        Ok(self.handle.address())
    }

    fn count(&self) -> Option<usize> {
        self.len
    }
}

/// Elements reached through a pointer slot.
///
/// The slot is dereferenced on every access, so the view follows the
/// pointer when the target process reallocates the buffer.
pub struct Ptr<'a, M: ?Sized, T> {
    slot: Handle<'a, M>,
    len: Option<usize>,
    _element: PhantomData<T>,
}

impl<M: ?Sized, T> Clone for Ptr<'_, M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized, T> Copy for Ptr<'_, M, T> {}

impl<'a, M: ReadMemory + ?Sized, T: Primitive> Ptr<'a, M, T> {
    /// `slot` is the address holding the pointer, not the pointer's target
    pub fn new(slot: Handle<'a, M>, len: usize) -> Self {
        Self {
            slot,
            len: Some(len),
            _element: PhantomData,
        }
    }

    pub fn unbounded(slot: Handle<'a, M>) -> Self {
        Self {
            slot,
            len: None,
            _element: PhantomData,
        }
    }

    pub fn slot(&self) -> Address {
        self.slot.address()
    }

    pub fn len(&self) -> Option<usize> {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == Some(0)
    }

    /// Pointer value currently stored in the slot
    pub fn address(&self) -> Result<Address> {
        if self.slot.is_null() {
            return Err(Error::NullPointer("pointer slot"));
        }
        self.slot.memory().read_address(self.slot.address())
    }

    /// Reseat the pointer. The previous target is left as is.
    pub fn set_address(&self, target: Address) -> Result<()>
    where
        M: WriteMemory,
    {
        if self.slot.is_null() {
            return Err(Error::NullPointer("pointer slot"));
        }
        self.slot.memory().write_address(self.slot.address(), target)
    }

    /// First element of the target
    pub fn content(&self) -> Result<T> {
        self.get(0)
    }

    pub fn set_content(&self, value: T) -> Result<()>
    where
        M: WriteMemory,
    {
        self.set(0, value)
    }
}

impl<M: ReadMemory + ?Sized, T: Primitive> Overlay for Ptr<'_, M, T> {
    type Memory = M;
    type Element = T;

    fn memory(&self) -> &M {
        self.slot.memory()
    }

    fn base(&self) -> Result<Address> {
        match self.address()? {
            0 => Err(Error::NullPointer("pointer target")),
            target => Ok(target),
        }
    }

    fn count(&self) -> Option<usize> {
        self.len
    }
}
